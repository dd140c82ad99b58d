//! Static table of report endpoints and the parameters each one takes.
//!
//! The registry is plain immutable data built once per process. The order of
//! endpoints is the order they are offered in the selector; the order of
//! parameters is the order the form renders them.

use std::sync::OnceLock;

static REGISTRY: OnceLock<EndpointRegistry> = OnceLock::new();

/// One entry of a select parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Input kind of a parameter. Options only exist for `Select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Text,
    Password,
    Date,
    Boolean,
    Select(&'static [SelectOption]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub kind: ParameterKind,
    pub placeholder: Option<&'static str>,
    pub required: bool,
}

impl ParameterDescriptor {
    pub const fn text(name: &'static str, placeholder: &'static str) -> Self {
        Self {
            name,
            kind: ParameterKind::Text,
            placeholder: Some(placeholder),
            required: false,
        }
    }

    pub const fn password(name: &'static str, placeholder: &'static str) -> Self {
        Self {
            name,
            kind: ParameterKind::Password,
            placeholder: Some(placeholder),
            required: false,
        }
    }

    pub const fn date(name: &'static str) -> Self {
        Self {
            name,
            kind: ParameterKind::Date,
            placeholder: None,
            required: false,
        }
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self {
            name,
            kind: ParameterKind::Boolean,
            placeholder: None,
            required: false,
        }
    }

    pub const fn select(
        name: &'static str,
        placeholder: &'static str,
        options: &'static [SelectOption],
    ) -> Self {
        Self {
            name,
            kind: ParameterKind::Select(options),
            placeholder: Some(placeholder),
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, ParameterKind::Boolean)
    }
}

/// A backend route together with the form it needs.
#[derive(Debug, Clone)]
pub struct EndpointSchema {
    pub path: &'static str,
    pub title: &'static str,
    pub parameters: Vec<ParameterDescriptor>,
}

#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: Vec<EndpointSchema>,
}

impl EndpointRegistry {
    pub fn new(endpoints: Vec<EndpointSchema>) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &[EndpointSchema] {
        &self.endpoints
    }

    pub fn get(&self, path: &str) -> Option<&EndpointSchema> {
        self.endpoints.iter().find(|e| e.path == path)
    }

    /// Parameters of `path`. An unknown path has no fields.
    pub fn parameters(&self, path: &str) -> &[ParameterDescriptor] {
        self.get(path).map(|e| e.parameters.as_slice()).unwrap_or(&[])
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.endpoints.iter().position(|e| e.path == path)
    }
}

/// The process-wide registry of report endpoints.
pub fn registry() -> &'static EndpointRegistry {
    REGISTRY.get_or_init(|| EndpointRegistry::new(report_endpoints()))
}

const PERIODS: &[SelectOption] = &[
    SelectOption { value: "day", label: "Day" },
    SelectOption { value: "month", label: "Month" },
    SelectOption { value: "year", label: "Year" },
];

const FLOW_ACTIONS: &[SelectOption] = &[
    SelectOption { value: "ACCEPT", label: "Accept" },
    SelectOption { value: "REJECT", label: "Reject" },
];

const PROTOCOLS: &[SelectOption] = &[
    SelectOption { value: "TCP", label: "TCP" },
    SelectOption { value: "UDP", label: "UDP" },
];

const ACCOUNTS_HINT: &str =
    "Not mandatory, filter by account separated by comma, e.g: '123123123123,321321321321'";

const CONNECTION: [ParameterDescriptor; 5] = [
    ParameterDescriptor::text("environment_sub_domain", "Enter Sub Domain").required(),
    ParameterDescriptor::text("environment_user_name", "Enter User Name").required(),
    ParameterDescriptor::password("environment_password", "Enter Password").required(),
    ParameterDescriptor::text("environment_f2a_token", "F2A Token if set"),
    ParameterDescriptor::text("ws_name", "The workspace to fetch information from").required(),
];

/// Connection block, then `specific`, then the trailing `stage` flag.
fn with_connection(specific: &[ParameterDescriptor]) -> Vec<ParameterDescriptor> {
    let mut parameters = Vec::with_capacity(CONNECTION.len() + specific.len() + 1);
    parameters.extend_from_slice(&CONNECTION);
    parameters.extend_from_slice(specific);
    parameters.push(ParameterDescriptor::boolean("stage"));
    parameters
}

fn report_endpoints() -> Vec<EndpointSchema> {
    vec![
        EndpointSchema {
            path: "/generate_cost_report_main_pipeline",
            title: "Cost Report",
            parameters: with_connection(&[
                ParameterDescriptor::date("start_timestamp").required(),
                ParameterDescriptor::date("end_timestamp").required(),
                ParameterDescriptor::select("period", "Select period", PERIODS).required(),
            ]),
        },
        EndpointSchema {
            path: "/generate_cost_recommendations",
            title: "Cost Recommendations",
            parameters: with_connection(&[]),
        },
        EndpointSchema {
            path: "/generate_compliance_report",
            title: "Compliance Report",
            parameters: with_connection(&[
                ParameterDescriptor::text(
                    "compliance_standard",
                    "Compliance standard name (case sensitive)",
                )
                .required(),
                ParameterDescriptor::text("accounts", ACCOUNTS_HINT),
                ParameterDescriptor::text("label", "Not mandatory, add a specific label"),
            ]),
        },
        EndpointSchema {
            path: "/generate_export_inventory",
            title: "Export Inventory",
            parameters: with_connection(&[
                ParameterDescriptor::text(
                    "resource_type",
                    "Resource Type, e.g: 'instance', 'security_group'",
                )
                .required(),
                ParameterDescriptor::text("accounts", ACCOUNTS_HINT),
                ParameterDescriptor::text(
                    "tags",
                    "Not mandatory, tags to filter by, e.g: 'key=Name|value~=test,key=Vendor|value=StreamSec'",
                ),
            ]),
        },
        EndpointSchema {
            path: "/export_ec2_os_info",
            title: "EC2 OS Info",
            parameters: with_connection(&[]),
        },
        EndpointSchema {
            path: "/export_inventory_count",
            title: "Inventory Count by Account",
            parameters: with_connection(&[ParameterDescriptor::text("accounts", ACCOUNTS_HINT)]),
        },
        EndpointSchema {
            path: "/export_flow_logs",
            title: "Flow Logs",
            parameters: with_connection(&[
                ParameterDescriptor::select("action", "Both actions", FLOW_ACTIONS),
                ParameterDescriptor::text(
                    "dst_resource_id",
                    "Not mandatory, destination resource ID to filter by",
                ),
                ParameterDescriptor::date("start_time"),
                ParameterDescriptor::date("end_time"),
                ParameterDescriptor::boolean("src_public"),
                ParameterDescriptor::select("protocols", "Both protocols", PROTOCOLS),
            ]),
        },
        EndpointSchema {
            path: "/export_eks_cost",
            title: "EKS Cost",
            parameters: with_connection(&[
                ParameterDescriptor::date("start_timestamp").required(),
                ParameterDescriptor::date("end_timestamp").required(),
            ]),
        },
        EndpointSchema {
            path: "/export_vulnerabilities",
            title: "Vulnerabilities",
            parameters: with_connection(&[]),
        },
        EndpointSchema {
            path: "/export_detections",
            title: "Detections",
            parameters: with_connection(&[]),
        },
    ]
}
