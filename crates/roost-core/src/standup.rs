//! Standup aggregation: a per-channel buffering window that collects lines
//! and flushes them as one message when the window closes.

use std::sync::Arc;

use roost_types::api::StandupActiveResponse;
use roost_types::models::StandupWindow;
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::{Store, now};

impl Store {
    /// Open a standup window on a channel for `length` seconds. Returns the
    /// unix time the window closes. A channel's window is reused across
    /// runs; two at once is rejected.
    pub fn standup_start(
        self: &Arc<Self>,
        token: &str,
        channel_id: u64,
        length: i64,
    ) -> CoreResult<i64> {
        let caller = self.resolve(token)?;
        let finish = self.with_state_mut(|state| {
            state.channel(channel_id)?;
            if state
                .standups
                .iter()
                .any(|s| s.channel_id == channel_id && s.is_active)
            {
                return Err(CoreError::input("Standup is already running"));
            }

            let finish = now() + length;
            let window = match state.standups.iter_mut().find(|s| s.channel_id == channel_id) {
                Some(window) => window,
                None => {
                    state.standups.push(StandupWindow::inactive(channel_id));
                    state.standups.last_mut().unwrap()
                }
            };
            window.is_active = true;
            window.time_finish = Some(finish);
            window.starter = Some(caller);
            window.lines.clear();
            Ok(finish)
        })?;

        // The window also closes lazily on reads, but the timer guarantees
        // the flush fires even if no client ever polls again.
        self.spawn_at(finish, |store| store.sweep_standups());

        info!(channel_id, finish, "standup started");
        Ok(finish)
    }

    /// Buffer one line into a channel's active standup as
    /// `"{caller handle}: {line}"`.
    pub fn standup_send(&self, token: &str, channel_id: u64, line: &str) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.channel(channel_id)?;
            state.require_member(channel_id, caller)?;
            let active = state
                .standups
                .iter()
                .any(|s| s.channel_id == channel_id && s.is_active);
            if !active {
                return Err(CoreError::input("Standup is not running"));
            }
            if line.chars().count() > 1000 {
                return Err(CoreError::input(
                    "Messages should be between 0 and 1000 characters long",
                ));
            }

            let handle = state.user(caller)?.handle.clone();
            let window = state
                .standups
                .iter_mut()
                .find(|s| s.channel_id == channel_id)
                .expect("active window exists");
            window.lines.push(format!("{handle}: {line}"));
            Ok(())
        })
    }

    /// Whether a standup is running in the channel, and when it finishes.
    /// Expired windows across all channels are flushed first, so the answer
    /// is authoritative at the moment of the call.
    pub fn standup_active(
        &self,
        token: &str,
        channel_id: u64,
    ) -> CoreResult<StandupActiveResponse> {
        self.resolve(token)?;
        self.sweep_standups();
        self.with_state(|state| {
            state.channel(channel_id)?;
            let window = state.standups.iter().find(|s| s.channel_id == channel_id);
            Ok(match window {
                Some(w) => StandupActiveResponse { is_active: w.is_active, time_finish: w.time_finish },
                None => StandupActiveResponse { is_active: false, time_finish: None },
            })
        })
    }

    /// Flush every window whose deadline has passed: join the buffered
    /// lines (each newline-terminated) into one message authored as the
    /// starter, skip entirely if nothing was buffered, and reset the window.
    pub fn sweep_standups(&self) {
        self.with_state_mut(|state| {
            let due: Vec<usize> = state
                .standups
                .iter()
                .enumerate()
                .filter(|(_, s)| s.time_finish.is_some_and(|finish| now() >= finish))
                .map(|(i, _)| i)
                .collect();

            for i in due {
                let window = &mut state.standups[i];
                let channel_id = window.channel_id;
                let starter = window.starter.take();
                let lines = std::mem::take(&mut window.lines);
                window.is_active = false;
                window.time_finish = None;

                if lines.is_empty() {
                    continue;
                }
                let Some(author) = starter else { continue };

                let body: String = lines.iter().map(|l| format!("{l}\n")).collect();
                let m_id = state.msg_counter;
                state.msg_counter += 1;
                state.deliver(m_id, channel_id, author, body);
                info!(channel_id, m_id, "standup flushed");
            }
        });
    }
}
