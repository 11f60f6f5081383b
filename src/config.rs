use std::time::Duration;

use crate::command::PositionProfile;

/// How long to wait for the drive to acknowledge a setpoint or reach a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between two reads.
    pub interval: Duration,
    /// Maximum number of sleeps before giving up.
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_polls: 20,
        }
    }
}

/// Settings of an [`crate::Epos4`] connection.
///
/// The defaults connect to node 1 of an EPOS4 on the first USB port:
///
/// ```rust
/// let settings = epos4::Settings::default().with_node_id(2).with_port("USB1");
/// assert_eq!(settings.device_name, "EPOS4");
/// assert_eq!(settings.node_id, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Device name handed to `VCS_OpenDevice`.
    pub device_name: String,
    /// Protocol stack name handed to `VCS_OpenDevice`.
    pub protocol_stack_name: String,
    /// Interface name handed to `VCS_OpenDevice`.
    pub interface_name: String,
    /// Port name handed to `VCS_OpenDevice`.
    pub port_name: String,
    /// Must match the DIP switch setting of the drive.
    pub node_id: u16,
    /// Profile set by [`crate::Epos4::enable`].
    pub profile: PositionProfile,
    /// Used by [`crate::Epos4::wait_acknowledged`] and [`crate::Epos4::wait_target_reached`].
    pub poll: PollPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_name: "EPOS4".to_string(),
            protocol_stack_name: "MAXON SERIAL V2".to_string(),
            interface_name: "USB".to_string(),
            port_name: "USB0".to_string(),
            node_id: 1,
            profile: PositionProfile::default(),
            poll: PollPolicy::default(),
        }
    }
}

impl Settings {
    /// Use another node id.
    pub fn with_node_id(mut self, node_id: u16) -> Self {
        self.node_id = node_id;
        self
    }

    /// Use another port on the same interface, e.g. `"USB1"`.
    pub fn with_port(mut self, port_name: impl Into<String>) -> Self {
        self.port_name = port_name.into();
        self
    }

    /// Use another interface, e.g. `"RS232"` with port `"COM1"`.
    pub fn with_interface(
        mut self,
        interface_name: impl Into<String>,
        port_name: impl Into<String>,
    ) -> Self {
        self.interface_name = interface_name.into();
        self.port_name = port_name.into();
        self
    }

    /// Use another position profile when enabling.
    pub fn with_profile(mut self, profile: PositionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Use another polling policy.
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
