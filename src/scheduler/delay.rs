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

use std::time::Duration;

/// Delay used when the stored schedule cannot be trusted.
pub const MIN_CHECK_DELAY: Duration = Duration::from_secs(1);

/// When the next check cycle should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextCheck {
    pub delay: Duration,
    /// The computed delay was negative or longer than the frequency and was
    /// replaced by [`MIN_CHECK_DELAY`].
    pub clamped: bool,
}

/// `last_check + frequency - now`, clamped to [`MIN_CHECK_DELAY`] when it is
/// negative (overdue) or exceeds `frequency` (clock skew, corrupted state).
pub fn compute_next_delay(last_check: i64, frequency: i64, now: i64) -> NextCheck {
    let remaining = last_check.saturating_add(frequency).saturating_sub(now);

    if remaining < 0 || remaining > frequency {
        if last_check == 0 {
            log::debug!("No previous update check recorded, checking shortly");
        } else {
            log::warn!(
                "Next update check computed as {remaining}s (last check {last_check}, \
                 frequency {frequency}s, now {now}), rechecking in {}s",
                MIN_CHECK_DELAY.as_secs()
            );
        }
        return NextCheck {
            delay: MIN_CHECK_DELAY,
            clamped: true,
        };
    }

    NextCheck {
        delay: Duration::from_secs(remaining as u64),
        clamped: false,
    }
}
