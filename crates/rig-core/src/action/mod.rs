//! Control action contract and shared identity record.
//!
//! Every unit the orchestrator sequences implements [`ControlAction`]:
//! a start half, a stop half, and the two dump halves that make the
//! `.param` sidecar self-describing. The original design used a deep
//! inheritance chain; here the shared fields live in one [`ActionCore`]
//! record and variants append their own dump fields after calling the
//! shared-field helpers.

pub mod command;
pub mod java;
pub mod process;
pub mod reboot;
pub mod replace;
pub mod wrappers;

pub use command::{CommandAction, RexecAction, RshAction, ServiceAction};
pub use java::{JavaProcessAction, JavaProcessConfig};
pub use process::{NativeProcessAction, ProcessPriority};
pub use reboot::{RebootAction, RemoteConsole};
pub use replace::ReplaceInFiles;
pub use wrappers::{OnStart, OnStop, Sleep};

use crate::dump::ParamDump;
use rig_common::{ActionId, IdAllocator, Result};

/// Identity shared by every control action.
///
/// Assigned once at construction and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ActionCore {
    pub id: ActionId,
    pub description: String,
    pub active: bool,
}

impl ActionCore {
    pub fn new(ids: &IdAllocator, description: impl Into<String>, active: bool) -> Self {
        ActionCore {
            id: ids.next_id(),
            description: description.into(),
            active,
        }
    }
}

/// A named, orderable unit of start/stop behavior.
pub trait ControlAction {
    /// Shared identity record.
    fn core(&self) -> &ActionCore;

    /// Concrete kind name, included literally in dumps.
    fn kind(&self) -> &'static str;

    /// Bring the action up.
    ///
    /// `Ok(true)` means started; `Ok(false)` is a deliberate failure that
    /// halts the remaining sequence without raising. `Err` is reserved for
    /// exceptional conditions (unopenable rewrite target, unspawnable
    /// child) and aborts the run.
    fn start(&self) -> Result<bool> {
        Ok(true)
    }

    /// Tear the action down. Failures are reported, never propagated, so
    /// sibling cleanup always proceeds.
    fn stop(&self) {}

    /// Append the type schema, shared fields first.
    fn describe_schema(&self, prefix: &str, dump: &mut ParamDump);

    /// Append the values, shared fields first, same field order as the
    /// schema.
    fn describe_values(&self, dump: &mut ParamDump);

    fn id(&self) -> ActionId {
        self.core().id
    }

    fn description(&self) -> &str {
        &self.core().description
    }

    fn active(&self) -> bool {
        self.core().active
    }
}

/// Schema entries common to all actions, in fixed order.
pub fn describe_base_schema(prefix: &str, dump: &mut ParamDump) {
    dump.type_item(prefix, "description", "string");
    dump.type_item(prefix, "type", "string");
    dump.type_item(prefix, "id", "integer");
    dump.type_item(prefix, "active", "boolean");
}

/// Value entries common to all actions, mirroring the schema order.
pub fn describe_base_values(core: &ActionCore, kind: &str, dump: &mut ParamDump) {
    dump.value_item(core.id, "description", format!("\"{}\"", core.description));
    dump.value_item(core.id, "type", kind);
    dump.value_item(core.id, "id", core.id);
    dump.value_item(core.id, "active", core.active);
}
