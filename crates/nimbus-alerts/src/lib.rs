//! Threshold alerting over weather forecasts.
//!
//! Users register alerts pairing a city and a weather parameter with a
//! threshold condition. The [`Engine`] periodically evaluates every active
//! alert against fresh forecast data, persists the resulting trigger state,
//! and notifies through an [`AlertNotifier`]: one email per alert carrying
//! an address, plus a single batched notification per pass.
//!
//! Crate layout:
//!
//! - [`types`]: [`AlertSpec`], [`Alert`], [`ConditionKind`] and validation
//! - [`evaluator`]: pure condition matching and forecast trigger extraction
//! - [`store`]: the [`AlertStore`] seam and its in-memory implementation
//! - [`projection`]: the read-side [`AlertView`], derived at read time
//! - [`dispatch`]: the [`AlertNotifier`] seam and wire payloads
//! - [`engine`]: the evaluation pass itself

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod projection;
pub mod store;
pub mod types;

pub use dispatch::{AlertNotifier, BatchAlert, BatchPayload, EmailContext, LogNotifier};
pub use engine::{Engine, EngineConfig, PassResult};
pub use error::{AlertError, Result};
pub use projection::{AlertStatus, AlertView, TriggerView};
pub use store::{AlertStore, MemoryAlertStore};
pub use types::{Alert, AlertSpec, ConditionKind, TriggerPoint, MAX_CITY_LENGTH};
