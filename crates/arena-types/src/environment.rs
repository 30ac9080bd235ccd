//! Observed environment records served by the scoring service
//!
//! A `ProblemEnvironment` is one VM backing a contest problem, as the
//! scoring service sees it. The fleet keeper never owns these records; it
//! takes a read-only snapshot per reconcile cycle.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Lifecycle classification assigned by the scoring service.
///
/// On the wire this is a nullable string: `null` and `""` both mean the
/// scoring layer has not touched the instance yet, which for pool
/// accounting is equivalent to `READY`. The `Unclassified` variant keeps
/// that three-valued wire shape out of the rest of the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InnerStatus {
    /// Not yet classified by the scoring layer; counts as Ready
    #[default]
    Unclassified,
    /// Provisioning has not finished
    NotReady,
    /// Pooled and waiting for a challenger
    Ready,
    /// Assigned to a participant
    UnderChallenge,
    /// Being scored
    UnderScoring,
    /// Marked for removal by the scoring layer
    Abandoned,
}

const INNER_STATUS_WIRE: &[&str] = &[
    "NOT_READY",
    "READY",
    "UNDER_CHALLENGE",
    "UNDER_SCORING",
    "ABANDONED",
];

impl InnerStatus {
    /// Wire representation, `None` for `Unclassified`.
    pub fn wire_name(&self) -> Option<&'static str> {
        match self {
            InnerStatus::Unclassified => None,
            InnerStatus::NotReady => Some("NOT_READY"),
            InnerStatus::Ready => Some("READY"),
            InnerStatus::UnderChallenge => Some("UNDER_CHALLENGE"),
            InnerStatus::UnderScoring => Some("UNDER_SCORING"),
            InnerStatus::Abandoned => Some("ABANDONED"),
        }
    }

    /// True for statuses that count toward the warm pool (`Ready` plus
    /// the unclassified state the scoring layer has not visited yet).
    pub fn is_pool_ready(&self) -> bool {
        matches!(self, InnerStatus::Ready | InnerStatus::Unclassified)
    }

    /// True for statuses the planner may delete as surplus. Instances
    /// under challenge, under scoring, or already abandoned are never
    /// surplus candidates.
    pub fn is_deletion_candidate(&self) -> bool {
        matches!(
            self,
            InnerStatus::Ready | InnerStatus::NotReady | InnerStatus::Unclassified
        )
    }
}

impl fmt::Display for InnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name().unwrap_or("UNCLASSIFIED"))
    }
}

impl Serialize for InnerStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.wire_name() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for InnerStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)?.as_deref() {
            None | Some("") => Ok(InnerStatus::Unclassified),
            Some("NOT_READY") => Ok(InnerStatus::NotReady),
            Some("READY") => Ok(InnerStatus::Ready),
            Some("UNDER_CHALLENGE") => Ok(InnerStatus::UnderChallenge),
            Some("UNDER_SCORING") => Ok(InnerStatus::UnderScoring),
            Some("ABANDONED") => Ok(InnerStatus::Abandoned),
            Some(other) => Err(serde::de::Error::unknown_variant(other, INNER_STATUS_WIRE)),
        }
    }
}

/// One VM backing a problem environment, as listed by the scoring service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemEnvironment {
    /// Record id assigned by the scoring service
    pub id: Uuid,

    /// Instance name (also the fleet-side VM name)
    pub name: String,

    /// Lifecycle classification; absent field, `null` and `""` all map
    /// to [`InnerStatus::Unclassified`]
    #[serde(default)]
    pub inner_status: InnerStatus,

    /// Cloud-side status string, pass-through only
    #[serde(default)]
    pub status: Option<String>,

    /// Problem this environment belongs to
    pub problem_id: String,

    /// Machine image the VM was created from; may be absent on records
    /// created outside the fleet keeper
    #[serde(default)]
    pub machine_image_name: Option<String>,

    /// Cloud project hosting the VM
    pub project: String,

    /// Cloud zone hosting the VM
    pub zone: String,

    /// Connection endpoint, pass-through only
    #[serde(default)]
    pub host: String,

    /// Login user, pass-through only
    #[serde(default)]
    pub user: String,

    /// Login password, pass-through only
    #[serde(default)]
    pub password: String,

    /// Exposed service kind (SSH, HTTPS, ...), pass-through only
    #[serde(default)]
    pub service: String,

    /// Exposed port, pass-through only
    #[serde(default)]
    pub port: u16,

    /// Creation timestamp; orders surplus deletion (newest first)
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Last update timestamp
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The VM record returned by the fleet-lifecycle service on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Generated instance name
    pub instance_name: String,

    /// Machine image the instance was created from
    pub machine_image_name: String,

    /// DNS name assigned to the instance
    #[serde(default)]
    pub domain: String,

    /// Cloud-side status string
    #[serde(default)]
    pub status: String,

    /// Problem the instance was created for
    pub problem_id: String,

    /// Login user provisioned on the instance
    #[serde(default)]
    pub user_id: String,

    /// Login password provisioned on the instance
    #[serde(default)]
    pub password: String,
}
