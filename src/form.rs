//! Schema-driven form: descriptors in, a widget-independent field tree out,
//! and the JSON payload built back from the live values.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::labels::display_name;
use crate::registry::{ParameterDescriptor, ParameterKind};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";

/// Input purpose of a single-line entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryPurpose {
    Text,
    Password,
    Date,
}

/// One choice of a dropdown. The placeholder choice is disabled and carries
/// an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldWidget {
    Entry {
        purpose: EntryPurpose,
        placeholder: String,
    },
    Checkbox,
    Dropdown {
        choices: Vec<Choice>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub id: String,
    pub label: String,
    pub widget: FieldWidget,
    pub required: bool,
}

/// Rendered form for one endpoint, fields in descriptor order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub fields: Vec<FieldView>,
}

impl FormView {
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Render a descriptor list. An empty list renders an empty form.
pub fn render_form(descriptors: &[ParameterDescriptor]) -> FormView {
    FormView {
        fields: descriptors.iter().map(render_field).collect(),
    }
}

fn render_field(descriptor: &ParameterDescriptor) -> FieldView {
    let placeholder = descriptor.placeholder.unwrap_or_default().to_string();
    let widget = match descriptor.kind {
        ParameterKind::Text => FieldWidget::Entry {
            purpose: EntryPurpose::Text,
            placeholder,
        },
        ParameterKind::Password => FieldWidget::Entry {
            purpose: EntryPurpose::Password,
            placeholder,
        },
        ParameterKind::Date => FieldWidget::Entry {
            purpose: EntryPurpose::Date,
            placeholder: descriptor.placeholder.unwrap_or(DATE_PLACEHOLDER).to_string(),
        },
        ParameterKind::Boolean => FieldWidget::Checkbox,
        ParameterKind::Select(options) => {
            let mut choices = Vec::with_capacity(options.len() + 1);
            choices.push(Choice {
                value: String::new(),
                label: if placeholder.is_empty() {
                    "Select...".to_string()
                } else {
                    placeholder
                },
                enabled: false,
            });
            choices.extend(options.iter().map(|o| Choice {
                value: o.value.to_string(),
                label: o.label.to_string(),
                enabled: true,
            }));
            FieldWidget::Dropdown { choices }
        }
    };

    FieldView {
        id: descriptor.name.to_string(),
        label: display_name(descriptor.name).to_string(),
        widget,
        required: descriptor.required,
    }
}

/// Live value of one rendered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

/// Current values of the rendered fields, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: HashMap<String, FieldValue>,
}

impl FormState {
    /// Untouched state for a freshly rendered view.
    pub fn for_view(view: &FormView) -> Self {
        let values = view
            .fields
            .iter()
            .map(|field| {
                let value = match field.widget {
                    FieldWidget::Checkbox => FieldValue::Flag(false),
                    _ => FieldValue::Text(String::new()),
                };
                (field.id.clone(), value)
            })
            .collect();
        Self { values }
    }

    pub fn set_text(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.values.insert(id.into(), FieldValue::Text(value.into()));
    }

    pub fn set_flag(&mut self, id: impl Into<String>, checked: bool) {
        self.values.insert(id.into(), FieldValue::Flag(checked));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn flag(&self, id: &str) -> bool {
        matches!(self.values.get(id), Some(FieldValue::Flag(true)))
    }

    fn text(&self, id: &str) -> &str {
        match self.values.get(id) {
            Some(FieldValue::Text(text)) => text,
            _ => "",
        }
    }
}

/// Request body: parameter name to string or boolean.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read the value of one descriptor the way the matching input reports it.
pub fn field_value(descriptor: &ParameterDescriptor, state: &FormState) -> Value {
    match descriptor.kind {
        ParameterKind::Boolean => Value::Bool(state.flag(descriptor.name)),
        ParameterKind::Date => Value::String(normalize_date(state.text(descriptor.name))),
        _ => Value::String(state.text(descriptor.name).to_string()),
    }
}

/// A date input only ever reports a valid `YYYY-MM-DD` or nothing.
fn normalize_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Collect the current values for `descriptors`. Never fails; untouched
/// fields report empty strings or `false`.
pub fn build_payload(descriptors: &[ParameterDescriptor], state: &FormState) -> Payload {
    let mut map = Map::new();
    for descriptor in descriptors {
        map.insert(descriptor.name.to_string(), field_value(descriptor, state));
    }
    Payload(map)
}

/// Required descriptors whose value is still empty.
pub fn missing_required<'a>(
    descriptors: &'a [ParameterDescriptor],
    state: &FormState,
) -> Vec<&'a ParameterDescriptor> {
    descriptors
        .iter()
        .filter(|d| d.required && !d.is_boolean())
        .filter(|d| matches!(field_value(d, state), Value::String(ref s) if s.trim().is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{registry, SelectOption};

    #[test]
    fn every_endpoint_renders_one_field_per_descriptor_in_order() {
        for endpoint in registry().endpoints() {
            let view = render_form(&endpoint.parameters);
            let ids: Vec<_> = view.ids().collect();
            let names: Vec<_> = endpoint.parameters.iter().map(|p| p.name).collect();
            assert_eq!(ids, names, "{}", endpoint.path);
        }
    }

    #[test]
    fn switching_endpoints_leaves_nothing_behind() {
        let flow_params = registry().parameters("/export_flow_logs");
        let mut state = FormState::for_view(&render_form(flow_params));
        state.set_text("dst_resource_id", "eni-123");
        state.set_text("protocols", "TCP");
        state.set_flag("src_public", true);

        let eks_params = registry().parameters("/export_eks_cost");
        let eks = render_form(eks_params);
        state = FormState::for_view(&eks);

        let eks_names: Vec<_> = eks_params.iter().map(|p| p.name).collect();
        for p in flow_params {
            assert_eq!(state.contains(p.name), eks_names.contains(&p.name), "{}", p.name);
        }
        assert_eq!(state.len(), eks_names.len());
        assert!(eks.ids().all(|id| state.contains(id)));

        let payload = build_payload(eks_params, &state);
        assert_eq!(payload.keys().count(), eks_names.len());
        assert!(payload.get("src_public").is_none());
        assert_eq!(payload.get("ws_name"), Some(&Value::from("")));
    }

    #[test]
    fn default_state_is_empty() {
        assert!(FormState::default().is_empty());
        assert!(!FormState::for_view(&render_form(registry().parameters("/export_detections"))).is_empty());
    }

    #[test]
    fn unknown_endpoint_renders_nothing() {
        let view = render_form(registry().parameters("/missing"));
        assert!(view.is_empty());
        assert!(build_payload(registry().parameters("/missing"), &FormState::default()).is_empty());
    }

    #[test]
    fn label_comes_from_display_name_not_placeholder() {
        let view = render_form(&[ParameterDescriptor::text("ws_name", "Enter WS Name")]);
        assert_eq!(view.fields[0].label, "Workspace Name");
    }

    #[test]
    fn select_starts_with_disabled_placeholder() {
        const OPTIONS: &[SelectOption] = &[
            SelectOption { value: "a", label: "A" },
            SelectOption { value: "b", label: "B" },
        ];
        let view = render_form(&[ParameterDescriptor::select("pick", "Pick one", OPTIONS).required()]);
        let field = &view.fields[0];
        assert!(field.required);
        match &field.widget {
            FieldWidget::Dropdown { choices } => {
                assert_eq!(choices.len(), 3);
                assert_eq!(choices[0].value, "");
                assert_eq!(choices[0].label, "Pick one");
                assert!(!choices[0].enabled);
                assert_eq!(choices[1].value, "a");
                assert_eq!(choices[2].label, "B");
            }
            other => panic!("unexpected widget {other:?}"),
        }
    }

    #[test]
    fn boolean_renders_checkbox_without_placeholder() {
        let view = render_form(&[ParameterDescriptor::boolean("stage")]);
        assert_eq!(view.fields[0].widget, FieldWidget::Checkbox);
    }

    #[test]
    fn payload_has_exactly_the_descriptor_keys_with_typed_values() {
        let params = registry().parameters("/export_flow_logs");
        let state = FormState::for_view(&render_form(params));
        let payload = build_payload(params, &state);

        assert_eq!(payload.len(), params.len());
        for p in params {
            let value = payload.get(p.name).unwrap();
            if p.is_boolean() {
                assert_eq!(value, &Value::Bool(false));
            } else {
                assert_eq!(value, &Value::String(String::new()));
            }
        }
    }

    #[test]
    fn payload_reads_live_values() {
        let params = registry().parameters("/export_eks_cost");
        let mut state = FormState::for_view(&render_form(params));
        state.set_text("ws_name", "prod");
        state.set_text("start_timestamp", " 2024-01-05 ");
        state.set_text("end_timestamp", "05/01/2024");
        state.set_flag("stage", true);

        let payload = build_payload(params, &state);
        assert_eq!(payload.get("ws_name"), Some(&Value::from("prod")));
        assert_eq!(payload.get("start_timestamp"), Some(&Value::from("2024-01-05")));
        assert_eq!(payload.get("end_timestamp"), Some(&Value::from("")));
        assert_eq!(payload.get("stage"), Some(&Value::Bool(true)));
    }

    #[test]
    fn repeated_name_yields_one_key() {
        let params = [
            ParameterDescriptor::text("accounts", "first"),
            ParameterDescriptor::text("accounts", "second"),
        ];
        let mut state = FormState::default();
        state.set_text("accounts", "123");
        let payload = build_payload(&params, &state);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("accounts"), Some(&Value::from("123")));
    }

    #[test]
    fn missing_required_lists_empty_required_fields() {
        let params = registry().parameters("/generate_cost_report_main_pipeline");
        let mut state = FormState::for_view(&render_form(params));
        state.set_text("environment_sub_domain", "acme");
        state.set_text("start_timestamp", "not a date");

        let missing: Vec<_> = missing_required(params, &state)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert!(!missing.contains(&"environment_sub_domain"));
        assert!(!missing.contains(&"environment_f2a_token"));
        assert!(missing.contains(&"start_timestamp"));
        assert!(missing.contains(&"period"));
        assert!(!missing.contains(&"stage"));
    }

    #[test]
    fn payload_serializes_as_flat_object() {
        let params = [
            ParameterDescriptor::text("ws_name", ""),
            ParameterDescriptor::boolean("stage"),
        ];
        let mut state = FormState::default();
        state.set_text("ws_name", "dev");
        let json = serde_json::to_value(build_payload(&params, &state)).unwrap();
        assert_eq!(json, serde_json::json!({"ws_name": "dev", "stage": false}));
    }
}
