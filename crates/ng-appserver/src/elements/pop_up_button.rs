use std::sync::Arc;

use serde_json::Value;

use super::html;
use super::required;
use super::single_form_value;
use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::association::Association;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;
use crate::error::StateError;
use crate::value::display_string;
use crate::value::is_truthy;

/// Option value submitted when the `noSelectionString` entry is chosen.
const NO_SELECTION: &str = "NO_SELECTION_OPTION_VALUE";

/// `<select>` over the items of `list`.
///
/// Options are valued by their index in the list, so the submitted form value
/// is resolved back to the item itself. With `multiple` bound true the chosen
/// items are written to `selections` as a list.
#[derive(Debug)]
pub struct PopUpButton {
    list: Association,
    item: Option<Association>,
    index: Option<Association>,
    display_string: Option<Association>,
    no_selection_string: Option<Association>,
    selection: Option<Association>,
    selections: Option<Association>,
    multiple: Option<Association>,
    name: Option<Association>,
    disabled: Option<Association>,
    attributes: Associations,
}

impl PopUpButton {
    pub fn new(
        name: &str,
        mut associations: Associations,
        _content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self {
            list: required(&mut associations, name, "list")?,
            item: associations.remove("item"),
            index: associations.remove("index"),
            display_string: associations.remove("displayString"),
            no_selection_string: associations.remove("noSelectionString"),
            selection: associations.remove("selection"),
            selections: associations.remove("selections"),
            multiple: associations.remove("multiple"),
            name: associations.remove("name"),
            disabled: associations.remove("disabled"),
            attributes: associations,
        })
    }

    fn name(&self, cx: &Context<'_>) -> String {
        self.name
            .as_ref()
            .and_then(|name| display_string(&cx.value(name)))
            .unwrap_or_else(|| cx.element_path().to_string())
    }

    fn flag(cx: &Context<'_>, association: Option<&Association>) -> bool {
        association.is_some_and(|association| is_truthy(&cx.value(association)))
    }

    fn items(&self, cx: &Context<'_>) -> Vec<Value> {
        match cx.value(&self.list) {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            single => vec![single],
        }
    }

    /// The list item an option value points at.
    fn resolve(items: &[Value], name: &str, option: &str) -> Result<Value, StateError> {
        option
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index).cloned())
            .ok_or_else(|| StateError::InvalidSelection {
                name: name.to_string(),
                value: option.to_string(),
            })
    }

    fn is_selected(&self, cx: &Context<'_>, multiple: bool, item: &Value) -> bool {
        if multiple {
            self.selections
                .as_ref()
                .is_some_and(|selections| match cx.value(selections) {
                    Value::Array(selected) => selected.contains(item),
                    _ => false,
                })
        } else {
            self.selection
                .as_ref()
                .is_some_and(|selection| cx.value(selection) == *item)
        }
    }
}

impl DynamicElement for PopUpButton {
    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        if Self::flag(cx, self.disabled.as_ref()) {
            return Ok(());
        }
        let name = self.name(cx);

        if Self::flag(cx, self.multiple.as_ref()) {
            let Some(selections) = &self.selections else {
                return Ok(());
            };
            let submitted = cx.request().form_values(&name);
            if submitted.is_empty() {
                return Ok(());
            }
            let items = self.items(cx);
            let chosen = submitted
                .iter()
                .filter(|option| option.as_str() != NO_SELECTION)
                .map(|option| Self::resolve(&items, &name, option))
                .collect::<Result<Vec<_>, _>>()?;
            cx.set_value(selections, Value::Array(chosen))?;
            return Ok(());
        }

        let Some(selection) = &self.selection else {
            return Ok(());
        };
        let chosen = match single_form_value(cx, &name)? {
            None => return Ok(()),
            Some(Value::String(option)) if option != NO_SELECTION => {
                Self::resolve(&self.items(cx), &name, &option)?
            }
            Some(_) => Value::Null,
        };
        cx.set_value(selection, chosen)?;
        Ok(())
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        let multiple = Self::flag(cx, self.multiple.as_ref());
        let mut attributes = vec![("name".to_string(), Value::String(self.name(cx)))];
        attributes.extend(html::additional_attributes(cx, &self.attributes));
        attributes.push(("multiple".to_string(), Value::Bool(multiple)));
        attributes.push((
            "disabled".to_string(),
            Value::Bool(Self::flag(cx, self.disabled.as_ref())),
        ));
        cx.append_content_string(&html::start_tag("select", &attributes, false));

        if let Some(no_selection) = &self.no_selection_string {
            let label = display_string(&cx.value(no_selection)).unwrap_or_default();
            cx.append_content_string(&format!(
                "<option value=\"{NO_SELECTION}\">{}</option>",
                html::escape(&label)
            ));
        }

        for (index, item) in self.items(cx).into_iter().enumerate() {
            if let Some(association) = &self.index {
                cx.set_value(association, Value::from(index))?;
            }
            if let Some(association) = &self.item {
                cx.set_value(association, item.clone())?;
            }
            let label = match &self.display_string {
                Some(association) => display_string(&cx.value(association)),
                None => display_string(&item),
            }
            .unwrap_or_default();

            let option = [
                ("value".to_string(), Value::from(index)),
                (
                    "selected".to_string(),
                    Value::Bool(self.is_selected(cx, multiple, &item)),
                ),
            ];
            cx.append_content_string(&html::start_tag("option", &option, false));
            cx.append_content_string(&html::escape(&label));
            cx.append_content_string("</option>");
        }
        if let Some(association) = &self.item {
            cx.set_value(association, Value::Null)?;
        }

        cx.append_content_string("</select>");
        Ok(())
    }
}
