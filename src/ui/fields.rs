use gtk4::prelude::*;
use gtk4::{
    Box as GtkBox, CheckButton, DropDown, Entry, InputPurpose, Label, Orientation, Widget,
};

use crate::form::{EntryPurpose, FieldView, FieldWidget, FormState, FormView};

enum FieldInput {
    Entry(Entry),
    Check(CheckButton),
    Choice { dropdown: DropDown, values: Vec<String> },
}

impl FieldInput {
    fn widget(&self) -> Widget {
        match self {
            FieldInput::Entry(entry) => entry.clone().upcast(),
            FieldInput::Check(check) => check.clone().upcast(),
            FieldInput::Choice { dropdown, .. } => dropdown.clone().upcast(),
        }
    }
}

/// Widgets of the currently rendered form, in field order.
#[derive(Default)]
pub struct RenderedFields {
    inputs: Vec<(String, FieldInput)>,
}

impl RenderedFields {
    /// Snapshot of the live widget values.
    pub fn state(&self) -> FormState {
        let mut state = FormState::default();
        for (id, input) in &self.inputs {
            match input {
                FieldInput::Entry(entry) => state.set_text(id.as_str(), entry.text().as_str()),
                FieldInput::Check(check) => state.set_flag(id.as_str(), check.is_active()),
                FieldInput::Choice { dropdown, values } => {
                    let value = values
                        .get(dropdown.selected() as usize)
                        .cloned()
                        .unwrap_or_default();
                    state.set_text(id.as_str(), value);
                }
            }
        }
        state
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|(id, _)| id.as_str())
    }

    /// Flag the fields in `ids` and clear the flag on every other field.
    pub fn mark_missing(&self, ids: &[&str]) {
        for (id, input) in &self.inputs {
            let widget = input.widget();
            if ids.contains(&id.as_str()) {
                widget.add_css_class("error");
            } else {
                widget.remove_css_class("error");
            }
        }
    }

    /// Wire every entry so pressing Enter activates `target`.
    pub fn connect_activate(&self, target: &impl IsA<Widget>) {
        for (_, input) in &self.inputs {
            if let FieldInput::Entry(entry) = input {
                let target = target.clone().upcast::<Widget>();
                entry.connect_activate(move |_| {
                    target.activate();
                });
            }
        }
    }
}

/// Replace everything in `container` with the fields of `view`.
pub fn render_into(container: &GtkBox, view: &FormView) -> RenderedFields {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }

    let mut inputs = Vec::with_capacity(view.fields.len());
    for field in &view.fields {
        let input = build_input(field);
        let widget = input.widget();
        widget.set_widget_name(&field.id);
        widget.set_hexpand(true);

        let group = GtkBox::new(Orientation::Vertical, 4);
        group.set_margin_bottom(8);
        if !matches!(input, FieldInput::Check(_)) {
            let text = if field.required {
                format!("{} *", field.label)
            } else {
                field.label.clone()
            };
            let label = Label::new(Some(&text));
            label.set_halign(gtk4::Align::Start);
            label.set_mnemonic_widget(Some(&widget));
            group.append(&label);
        }
        group.append(&widget);
        container.append(&group);

        inputs.push((field.id.clone(), input));
    }

    RenderedFields { inputs }
}

fn build_input(field: &FieldView) -> FieldInput {
    match &field.widget {
        FieldWidget::Entry {
            purpose,
            placeholder,
        } => {
            let entry = Entry::new();
            entry.set_placeholder_text(Some(placeholder));
            match purpose {
                EntryPurpose::Text => {}
                EntryPurpose::Password => {
                    entry.set_visibility(false);
                    entry.set_input_purpose(InputPurpose::Password);
                }
                EntryPurpose::Date => entry.set_max_length(10),
            }
            FieldInput::Entry(entry)
        }
        FieldWidget::Checkbox => {
            let check = CheckButton::with_label(&field.label);
            check.set_active(false);
            FieldInput::Check(check)
        }
        FieldWidget::Dropdown { choices } => {
            let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
            let dropdown = DropDown::from_strings(&labels);
            dropdown.set_selected(0);
            FieldInput::Choice {
                dropdown,
                values: choices.iter().map(|c| c.value.clone()).collect(),
            }
        }
    }
}
