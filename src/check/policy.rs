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

use crate::config::{ConfigStore, UPDATER_DOMAIN, component_enable_key};
use std::sync::Arc;

/// Decides whether a component may be checked for updates.
pub trait ComponentPolicy: Send + Sync {
    fn can_check(&self, component: &str) -> bool;
}

/// Permits everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl ComponentPolicy for AllowAll {
    fn can_check(&self, _component: &str) -> bool {
        true
    }
}

/// Reads `updater.enable-<component>`, defaulting to enabled.
pub struct ConfigComponentPolicy {
    store: Arc<dyn ConfigStore>,
}

impl ConfigComponentPolicy {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }
}

impl ComponentPolicy for ConfigComponentPolicy {
    fn can_check(&self, component: &str) -> bool {
        self.store
            .get_bool(UPDATER_DOMAIN, &component_enable_key(component), true)
    }
}
