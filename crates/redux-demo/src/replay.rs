//! Scripted replay of a JSON action log against the slices store
//!
//! The script is a JSON array of actions:
//!
//! ```json
//! [{ "type": "counter/increase", "payload": 5 }, { "type": "auth/login" }]
//! ```

use crate::slices;
use anyhow::{Context, Result};
use redux_store::{CombinedState, SliceAction, Store};
use redux_store_config::DemoConfig;
use std::path::Path;
use std::sync::Arc;

/// Outcome of running a script
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub applied: Vec<SliceAction>,
    pub rejected: Vec<(SliceAction, String)>,
}

pub fn parse_actions(content: &str) -> Result<Vec<SliceAction>> {
    serde_json::from_str(content).context("Action script must be a JSON array of actions")
}

pub fn load_actions(path: &Path) -> Result<Vec<SliceAction>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read action script {}", path.display()))?;
    parse_actions(&content)
}

/// Dispatch every action, recording which ones the store rejected
pub fn run_actions(
    store: &Store<CombinedState, SliceAction>,
    actions: Vec<SliceAction>,
) -> ReplayReport {
    let mut report = ReplayReport::default();
    for action in actions {
        match store.dispatch(action.clone()) {
            Ok(applied) => report.applied.push(applied),
            Err(e) => {
                log::warn!("Rejected `{}`: {}", action.kind, e);
                report.rejected.push((action, e.to_string()));
            }
        }
    }
    report
}

/// Fold the applied actions from the initial state and compare with the store
pub fn verify(store: &Store<CombinedState, SliceAction>, report: &ReplayReport) -> Result<bool> {
    let reducer = slices::root_reducer()?;
    let initial = Arc::new(reducer.initial_state());
    let replayed = redux_store::replay(&reducer, initial, &report.applied)?;
    Ok(slices::snapshot(&replayed) == slices::snapshot(&store.get_state()))
}

pub fn run(config: &DemoConfig, path: &Path) -> Result<()> {
    let actions = load_actions(path)?;
    log::info!("Replaying {} action(s) from {}", actions.len(), path.display());

    let store = slices::build_store(config)?;
    let report = run_actions(&store, actions);

    for (action, reason) in &report.rejected {
        println!("rejected {}: {}", action.kind, reason);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&slices::snapshot(&store.get_state()))?
    );

    if verify(&store, &report)? {
        println!("replay verified: {} action(s) applied", report.applied.len());
        Ok(())
    } else {
        anyhow::bail!("store state differs from folding the applied actions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slices::{AuthState, CounterSliceState, AUTH, COUNTER};
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = r#"[
        { "type": "counter/increment" },
        { "type": "counter/increment" },
        { "type": "counter/decrease" },
        { "type": "counter/increase", "payload": "ten" },
        { "type": "counter/increase", "payload": 5 },
        { "type": "auth/login" },
        { "type": "router/navigate", "payload": "/products" }
    ]"#;

    fn quiet_config() -> DemoConfig {
        DemoConfig {
            log_actions: false,
            ..DemoConfig::default()
        }
    }

    #[test]
    fn test_parse_actions() {
        let actions = parse_actions(SCRIPT).unwrap();
        assert_eq!(actions.len(), 7);
        assert_eq!(actions[0], SliceAction::new("counter/increment"));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_actions(r#"{ "type": "counter/increment" }"#).is_err());
    }

    #[test]
    fn test_run_actions_skips_rejected() {
        let store = slices::build_store(&quiet_config()).unwrap();

        let report = run_actions(&store, parse_actions(SCRIPT).unwrap());

        assert_eq!(report.applied.len(), 6);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0.kind, "counter/increase");

        let state = store.get_state();
        assert_eq!(
            *state.get::<CounterSliceState>(COUNTER).unwrap(),
            CounterSliceState {
                counter: 6,
                show_counter: true,
            }
        );
        assert!(state.get::<AuthState>(AUTH).unwrap().is_authenticated);
        assert!(verify(&store, &report).unwrap());
    }

    #[test]
    fn test_load_missing_script() {
        let err = load_actions(Path::new("/nonexistent/actions.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read action script"));
    }
}
