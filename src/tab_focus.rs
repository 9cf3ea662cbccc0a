use tracing::{debug, info, warn};

use crate::page::FormPage;

/// Keeps the session focused on the real content tab.
///
/// Remembers a "main" window handle and switches back to it before any
/// field resolution; when that handle is gone, probes the open windows for
/// the first one that is not an internal devtools page. Everything here is
/// best-effort: failures are logged and resolution proceeds regardless.
pub struct TabFocus {
    main_handle: Option<String>,
}

impl TabFocus {
    pub fn new() -> Self {
        Self { main_handle: None }
    }

    pub fn with_handle(handle: impl Into<String>) -> Self {
        Self {
            main_handle: Some(handle.into()),
        }
    }

    pub fn main_handle(&self) -> Option<&str> {
        self.main_handle.as_deref()
    }

    pub async fn focus_active_tab<P: FormPage>(&mut self, page: &P) {
        let handles = match page.window_handles().await {
            Ok(handles) => handles,
            Err(err) => {
                warn!(%err, "could not list window handles");
                return;
            }
        };
        if handles.is_empty() {
            warn!("no open windows");
            return;
        }

        let current = match page.current_window().await {
            Ok(current) => current,
            Err(err) => {
                warn!(%err, "could not read current window");
                return;
            }
        };

        // Remembered main handle still alive: just switch back to it.
        if let Some(main) = self.main_handle.clone()
            && handles.contains(&main)
        {
            if current != main {
                info!(from = %current, to = %main, "switching to main tab");
                if page.switch_window(&main).await.is_err() {
                    warn!("switch to main tab failed");
                }
            }
            return;
        }

        // Probe the other windows for the first non-devtools page.
        let mut fallback = None;
        for handle in &handles {
            if *handle == current {
                continue;
            }
            if page.switch_window(handle).await.is_err() {
                continue;
            }
            let url = match page.current_url().await {
                Ok(url) => url,
                Err(_) => continue,
            };

            debug!(%handle, %url, "probed tab");
            if !url.starts_with("devtools://") {
                fallback = Some(handle.clone());
                break;
            }
        }

        // Return to where we started so a failed probe leaves the session
        // in a known state.
        if page.switch_window(&current).await.is_err() {
            warn!("could not restore original tab");
        }

        if let Some(found) = fallback {
            self.main_handle = Some(found.clone());
            if found != current {
                info!(from = %current, to = %found, "switching to fallback tab");
                if page.switch_window(&found).await.is_err() {
                    warn!("switch to fallback tab failed");
                }
            }
        }
    }
}

impl Default for TabFocus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tab_focus_test.rs"]
mod tab_focus_test;
