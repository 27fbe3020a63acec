use std::sync::Arc;

use serde_json::Value;

use super::exactly_one_of;
use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::association::Association;
use crate::component::ActionResults;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;

#[derive(Debug)]
enum Source {
    List(Association),
    Count(Association),
}

/// Visits its content once per list item, or `count` times.
///
/// Iterations get consecutive path segments under a branch of their own.
#[derive(Debug)]
pub struct Repetition {
    source: Source,
    item: Option<Association>,
    index: Option<Association>,
    content: Option<Arc<Element>>,
}

impl Repetition {
    pub fn new(
        name: &str,
        mut associations: Associations,
        content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        let source = match exactly_one_of(&mut associations, name, ["list", "count"], "list, count")? {
            [Some(list), _] => Source::List(list),
            [None, Some(count)] => Source::Count(count),
            [None, None] => {
                return Err(BindingConfigurationError::MissingOneOf {
                    element: name.to_string(),
                    bindings: "list, count",
                })
            }
        };
        Ok(Self {
            source,
            item: associations.remove("item"),
            index: associations.remove("index"),
            content,
        })
    }

    /// Items for each iteration. Counted repetitions yield nulls lazily.
    fn items(&self, cx: &Context<'_>) -> Box<dyn Iterator<Item = Value>> {
        match &self.source {
            Source::List(list) => match cx.value(list) {
                Value::Array(items) => Box::new(items.into_iter()),
                Value::Null => Box::new(std::iter::empty()),
                single => Box::new(std::iter::once(single)),
            },
            Source::Count(count) => {
                let count = iteration_count(&cx.value(count));
                Box::new((0..count).map(|_| Value::Null))
            }
        }
    }

    /// Run `visit` over the content for each iteration, stopping at the first
    /// result it returns.
    fn each<R>(
        &self,
        cx: &mut Context<'_>,
        mut visit: impl FnMut(&Element, &mut Context<'_>) -> Result<Option<R>, EngineError>,
    ) -> Result<Option<R>, EngineError> {
        let items = self.items(cx);
        let mut found = None;

        cx.element_path_mut().add_branch();
        for (index, item) in items.enumerate() {
            if let Some(association) = &self.index {
                cx.set_value(association, Value::from(index))?;
            }
            if let (Some(association), Source::List(_)) = (&self.item, &self.source) {
                cx.set_value(association, item)?;
            }
            if let Some(content) = self.content.as_deref() {
                found = visit(content, cx)?;
                if found.is_some() {
                    break;
                }
            }
            cx.element_path_mut().increment();
        }
        cx.element_path_mut().remove_branch()?;

        if found.is_none() {
            if let Some(association) = &self.item {
                cx.set_value(association, Value::Null)?;
            }
        }
        Ok(found)
    }
}

/// Numbers and numeric strings, truncated toward zero. Anything else, and
/// anything negative, is zero.
fn iteration_count(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .unwrap_or_else(|| truncated(number.as_f64())),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .unwrap_or_else(|_| truncated(text.parse::<f64>().ok()))
        }
        _ => 0,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncated(count: Option<f64>) -> u64 {
    match count {
        Some(count) if count.is_finite() && count >= 1.0 => count.trunc() as u64,
        _ => 0,
    }
}

impl DynamicElement for Repetition {
    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        self.each(cx, |content, cx| content.take_values(cx).map(|()| None::<()>))?;
        Ok(())
    }

    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        self.each(cx, |content, cx| content.invoke_action(cx))
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        self.each(cx, |content, cx| content.append_to_response(cx).map(|()| None::<()>))?;
        Ok(())
    }

    fn is_structural(&self) -> bool {
        true
    }
}
