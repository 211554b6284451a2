//! Editable form over a [`PromptTemplate`]: one input per text field, a
//! [`DynamicList`] of inputs per list field, and the live generated prompt.

use std::collections::BTreeMap;

use crate::dynamic_list::DynamicList;
use crate::form::ChatForm;
use crate::prompt::{collect_fields, FieldKind, FieldValue, PromptTemplate};

#[derive(Debug, Clone)]
pub enum FieldInput {
    Text(ChatForm),
    List(DynamicList<ChatForm>),
}

/// Focus position: field index and item index (always 0 for text fields).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Focus {
    pub field: usize,
    pub item: usize,
}

#[derive(Debug, Clone)]
pub struct PromptForm {
    template: PromptTemplate,
    inputs: Vec<FieldInput>,
    focus: Focus,
}

impl PromptForm {
    pub fn new(template: PromptTemplate) -> Self {
        let inputs = template
            .fields()
            .iter()
            .map(|field| match template.config(&field.name).kind {
                FieldKind::Text => FieldInput::Text(ChatForm::new()),
                FieldKind::List => FieldInput::List(DynamicList::new(vec![ChatForm::new()])),
            })
            .collect();
        Self {
            template,
            inputs,
            focus: Focus::default(),
        }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn inputs(&self) -> &[FieldInput] {
        &self.inputs
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Every focusable slot in display order. An empty list keeps one slot
    /// so items can be added to it.
    fn slots(&self) -> Vec<Focus> {
        self.inputs
            .iter()
            .enumerate()
            .flat_map(|(field, input)| {
                let items = match input {
                    FieldInput::Text(_) => 1,
                    FieldInput::List(list) => list.len().max(1),
                };
                (0..items).map(move |item| Focus { field, item })
            })
            .collect()
    }

    pub fn focus_next(&mut self) {
        let slots = self.slots();
        if let Some(i) = slots.iter().position(|slot| *slot == self.focus) {
            self.focus = slots[(i + 1) % slots.len()];
        }
    }

    pub fn focus_prev(&mut self) {
        let slots = self.slots();
        if let Some(i) = slots.iter().position(|slot| *slot == self.focus) {
            self.focus = slots[(i + slots.len() - 1) % slots.len()];
        }
    }

    /// The input under the focus, if there is one.
    pub fn focused_mut(&mut self) -> Option<&mut ChatForm> {
        let Focus { field, item } = self.focus;
        match self.inputs.get_mut(field)? {
            FieldInput::Text(form) => Some(form),
            FieldInput::List(list) => list.get_mut(item),
        }
    }

    /// Append an item to the focused list field and focus it.
    pub fn add_item(&mut self) -> bool {
        let field = self.focus.field;
        match self.inputs.get_mut(field) {
            Some(FieldInput::List(list)) => {
                let item = list.add(ChatForm::new());
                self.focus = Focus { field, item };
                true
            }
            _ => false,
        }
    }

    /// Delete the focused item of a list field.
    pub fn delete_item(&mut self) -> bool {
        let Focus { field, item } = self.focus;
        match self.inputs.get_mut(field) {
            Some(FieldInput::List(list)) => {
                let deleted = list.delete(item).is_some();
                self.focus.item = item.min(list.len().saturating_sub(1));
                deleted
            }
            _ => false,
        }
    }

    /// Flat `name` / `name.N` entries, as a form submission would list them.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.template
            .fields()
            .iter()
            .zip(&self.inputs)
            .flat_map(|(field, input)| match input {
                FieldInput::Text(form) => vec![(field.name.clone(), form.input().to_string())],
                FieldInput::List(list) => list
                    .iter()
                    .enumerate()
                    .map(|(i, form)| (format!("{}.{i}", field.name), form.input().to_string()))
                    .collect(),
            })
            .collect()
    }

    pub fn values(&self) -> BTreeMap<String, FieldValue> {
        let mut values = collect_fields(self.entries());
        for (field, input) in self.template.fields().iter().zip(&self.inputs) {
            if matches!(input, FieldInput::List(_)) {
                values
                    .entry(field.name.clone())
                    .or_insert_with(|| FieldValue::List(Vec::new()));
            }
        }
        values
    }

    /// The generated prompt; the blanked-out preview until something is typed.
    pub fn prompt(&self) -> String {
        let untouched = self
            .entries()
            .iter()
            .all(|(_, value)| value.trim().is_empty());
        if untouched {
            self.template.preview()
        } else {
            self.template.materialize(&self.values())
        }
    }
}
