use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetKind {
    InfrastructureIp,
    Website,
    CameraIp,
    NvrIp,
}

impl TargetKind {
    pub fn label(self) -> &'static str {
        match self {
            TargetKind::InfrastructureIp => "IP Ping",
            TargetKind::Website => "Website",
            TargetKind::CameraIp => "Camera IP",
            TargetKind::NvrIp => "NVR IP",
        }
    }

    /// Websites are checked over HTTP, everything else with ICMP echo.
    pub fn uses_http(self) -> bool {
        matches!(self, TargetKind::Website)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub kind: TargetKind,
    pub display_name: String,
    pub location: String,
    /// Position within its kind: input index, or the numeric suffix for cameras.
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Online,
    /// The target answered, but not acceptably (e.g. HTTP 404).
    Failed { reason: String },
    /// Transport error, DNS failure, timeout or an unusable probe socket.
    Errored { reason: String },
}

impl ProbeOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ProbeOutcome::Online)
    }

    pub fn errored_out(&self) -> bool {
        matches!(self, ProbeOutcome::Errored { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Online => None,
            ProbeOutcome::Failed { reason } | ProbeOutcome::Errored { reason } => Some(reason.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Online,
    Offline,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Online => "Online",
            Status::Offline => "Offline",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ProbeOutcome> for Status {
    fn from(outcome: &ProbeOutcome) -> Self {
        if outcome.success() { Status::Online } else { Status::Offline }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub date: String,
    pub time: String,
    pub kind: TargetKind,
    pub name: String,
    pub location: String,
    pub target: String,
    pub status: Status,
}
