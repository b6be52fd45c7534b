/*! Identifier newtypes. */

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Operating system process identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct ProcessId(pub u32);

/// Identifier of a selection tracker registered on an `AxText` instance.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct TrackerId(pub u64);
