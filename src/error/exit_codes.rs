// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::UpkeepError;

pub fn get_exit_code(error: &UpkeepError) -> i32 {
    match error {
        UpkeepError::InvalidVersionFormat(_) | UpkeepError::ValidationError(_) => 2,

        UpkeepError::ConfigFile(_) | UpkeepError::ConfigError(_) => 3,

        UpkeepError::ComponentNotFound(_) | UpkeepError::NoPendingUpdate(_) => 4,

        UpkeepError::CorruptArchive(_) | UpkeepError::Extract(_) => 5,

        UpkeepError::SecurityError(_) => 6,

        UpkeepError::PermissionDenied(_) => 13,

        UpkeepError::NetworkError(_)
        | UpkeepError::Http(_)
        | UpkeepError::Download(_)
        | UpkeepError::ResponseParse { .. } => 20,

        _ => 1,
    }
}
