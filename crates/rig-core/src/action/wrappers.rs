//! Wrapper and timing actions.
//!
//! `OnStart` and `OnStop` each suppress one half of the wrapped action's
//! lifecycle; `Sleep` pauses the sequence for a fixed duration on both
//! halves. Wrappers get their own id; the wrapped action keeps its own
//! and contributes its dump lines after the wrapper's base fields.

use crate::action::{describe_base_schema, describe_base_values, ActionCore, ControlAction};
use crate::dump::{display_opt, ParamDump};
use rig_common::{IdAllocator, Result};
use std::thread;
use std::time::Duration;

/// Execute the wrapped action only on start; stop is suppressed.
pub struct OnStart {
    core: ActionCore,
    inner: Box<dyn ControlAction>,
}

impl OnStart {
    pub fn new(ids: &IdAllocator, inner: Box<dyn ControlAction>) -> Self {
        OnStart {
            core: ActionCore::new(ids, format!("{} on start", inner.description()), true),
            inner,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }
}

impl ControlAction for OnStart {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "OnStart"
    }

    fn start(&self) -> Result<bool> {
        self.inner.start()
    }

    // stop: inherited no-op, the wrapped action's stop is never invoked

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        self.inner.describe_schema(prefix, dump);
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        self.inner.describe_values(dump);
    }
}

/// Execute the wrapped action only on stop; start is suppressed.
pub struct OnStop {
    core: ActionCore,
    inner: Box<dyn ControlAction>,
}

impl OnStop {
    pub fn new(ids: &IdAllocator, inner: Box<dyn ControlAction>) -> Self {
        OnStop {
            core: ActionCore::new(ids, format!("{} on stop", inner.description()), true),
            inner,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }
}

impl ControlAction for OnStop {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "OnStop"
    }

    // start: inherited success no-op, the wrapped action's start is never
    // invoked

    fn stop(&self) {
        self.inner.stop();
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        self.inner.describe_schema(prefix, dump);
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        self.inner.describe_values(dump);
    }
}

/// Pause the sequence for a fixed (possibly fractional) number of seconds
/// on both start and stop.
pub struct Sleep {
    core: ActionCore,
    seconds: f64,
    message: Option<String>,
}

impl Sleep {
    pub fn new(ids: &IdAllocator, seconds: f64) -> Self {
        Sleep {
            core: ActionCore::new(ids, "Sleep", true),
            seconds,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.core.active = active;
        self
    }

    fn execute(&self) {
        match &self.message {
            Some(message) => println!("{message}"),
            None => println!("Sleeping {} seconds...", self.seconds),
        }
        thread::sleep(Duration::from_secs_f64(self.seconds));
    }
}

impl ControlAction for Sleep {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "Sleep"
    }

    fn start(&self) -> Result<bool> {
        self.execute();
        Ok(true)
    }

    fn stop(&self) {
        self.execute();
    }

    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
        describe_base_schema(prefix, dump);
        dump.type_item(prefix, "time", "float");
        dump.type_item(prefix, "message", "string");
    }

    fn describe_values(&self, dump: &mut ParamDump) {
        describe_base_values(&self.core, self.kind(), dump);
        let id = self.core.id;
        dump.value_item(id, "time", self.seconds);
        dump.value_item(id, "message", display_opt(self.message.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct Probe {
        core: ActionCore,
        starts: Arc<AtomicU32>,
        stops: Arc<AtomicU32>,
        start_result: bool,
    }

    impl Probe {
        fn boxed(
            ids: &IdAllocator,
            starts: Arc<AtomicU32>,
            stops: Arc<AtomicU32>,
            start_result: bool,
        ) -> Box<Self> {
            Box::new(Probe {
                core: ActionCore::new(ids, "probe", true),
                starts,
                stops,
                start_result,
            })
        }
    }

    impl ControlAction for Probe {
        fn core(&self) -> &ActionCore {
            &self.core
        }

        fn kind(&self) -> &'static str {
            "Probe"
        }

        fn start(&self) -> Result<bool> {
            self.starts.fetch_add(1, Ordering::Relaxed);
            Ok(self.start_result)
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::Relaxed);
        }

        fn describe_schema(&self, prefix: &str, dump: &mut ParamDump) {
            describe_base_schema(prefix, dump);
        }

        fn describe_values(&self, dump: &mut ParamDump) {
            describe_base_values(&self.core, self.kind(), dump);
        }
    }

    #[test]
    fn on_start_delegates_start_and_suppresses_stop() {
        let ids = IdAllocator::new();
        let starts = Arc::new(AtomicU32::new(0));
        let stops = Arc::new(AtomicU32::new(0));
        let wrapper = OnStart::new(&ids, Probe::boxed(&ids, starts.clone(), stops.clone(), true));

        assert!(wrapper.start().unwrap());
        wrapper.stop();

        assert_eq!(starts.load(Ordering::Relaxed), 1);
        assert_eq!(stops.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn on_start_propagates_inner_result() {
        let ids = IdAllocator::new();
        let starts = Arc::new(AtomicU32::new(0));
        let stops = Arc::new(AtomicU32::new(0));
        let wrapper = OnStart::new(&ids, Probe::boxed(&ids, starts, stops, false));
        assert!(!wrapper.start().unwrap());
    }

    #[test]
    fn on_stop_delegates_stop_and_suppresses_start() {
        let ids = IdAllocator::new();
        let starts = Arc::new(AtomicU32::new(0));
        let stops = Arc::new(AtomicU32::new(0));
        let wrapper = OnStop::new(&ids, Probe::boxed(&ids, starts.clone(), stops.clone(), true));

        assert!(wrapper.start().unwrap());
        wrapper.stop();

        assert_eq!(starts.load(Ordering::Relaxed), 0);
        assert_eq!(stops.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn wrapper_description_extends_inner_description() {
        let ids = IdAllocator::new();
        let starts = Arc::new(AtomicU32::new(0));
        let stops = Arc::new(AtomicU32::new(0));
        let on_start = OnStart::new(&ids, Probe::boxed(&ids, starts.clone(), stops.clone(), true));
        let on_stop = OnStop::new(&ids, Probe::boxed(&ids, starts, stops, true));
        assert_eq!(on_start.description(), "probe on start");
        assert_eq!(on_stop.description(), "probe on stop");
    }

    #[test]
    fn wrapper_dump_appends_inner_dump() {
        let ids = IdAllocator::new();
        let starts = Arc::new(AtomicU32::new(0));
        let stops = Arc::new(AtomicU32::new(0));
        let wrapper = OnStart::new(&ids, Probe::boxed(&ids, starts, stops, true));

        let mut dump = ParamDump::new();
        wrapper.describe_values(&mut dump);
        // Wrapper fields first (id 2), wrapped action's fields after (id 1).
        assert_eq!(dump.lines()[1], "2.type=OnStart");
        assert!(dump.lines().contains(&"1.type=Probe".to_string()));
    }

    #[test]
    fn sleep_start_returns_true_without_blocking_long() {
        let ids = IdAllocator::new();
        let action = Sleep::new(&ids, 0.0).with_message("pausing");
        assert!(action.start().unwrap());
        action.stop();
    }
}
