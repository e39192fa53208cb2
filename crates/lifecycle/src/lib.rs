//! Script lifecycle transition guard.
//!
//! [`TransitionGuard`] owns the two transitions the dashboard drives:
//! approving a pending script and posting a rendered video. Both check the
//! record with the pure [`decide`] function, write tentatively, trigger an
//! external workflow through a [`Notifier`], and revert the write if the
//! trigger fails.
//!
//! Content edits go through [`edit_script`], which only touches the
//! script text, caption, hashtags, and music fields.

pub mod decision;
pub mod edit;
pub mod error;
pub mod guard;
pub mod notifier;
pub mod webhook;

pub use decision::{decide, Decision, Operation, RecordState, RejectReason};
pub use edit::{edit_script, normalize_hashtags, EditableFields, EDITABLE_FIELDS};
pub use error::GuardError;
pub use guard::{TransitionGuard, TransitionOutcome};
pub use notifier::{Notifier, NotifyError, NotifyPayload, WorkflowEvent};
pub use webhook::{WebhookConfig, WebhookNotifier, DEFAULT_WEBHOOK_TIMEOUT, WEBHOOK_SECRET_HEADER};
