use std::sync::Arc;

use serde_json::Value;

use super::exactly_one_of;
use super::html;
use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::association::Association;
use crate::component::ActionResults;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;
use crate::value::display_string;

#[derive(Debug)]
enum Target {
    Action(Association),
    PageName(Association),
    Href(Association),
}

/// `<a>` that either links to a URL or routes back to an action.
#[derive(Debug)]
pub struct Hyperlink {
    target: Target,
    attributes: Associations,
    content: Option<Arc<Element>>,
}

impl Hyperlink {
    pub fn new(
        name: &str,
        mut associations: Associations,
        content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        let target = match exactly_one_of(
            &mut associations,
            name,
            ["action", "pageName", "href"],
            "action, pageName, href",
        )? {
            [Some(action), ..] => Target::Action(action),
            [None, Some(page_name), _] => Target::PageName(page_name),
            [None, None, Some(href)] => Target::Href(href),
            [None, None, None] => {
                return Err(BindingConfigurationError::MissingOneOf {
                    element: name.to_string(),
                    bindings: "action, pageName, href",
                })
            }
        };
        Ok(Self {
            target,
            attributes: associations,
            content,
        })
    }
}

impl DynamicElement for Hyperlink {
    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        match self.content.as_deref() {
            Some(content) => content.take_values(cx),
            None => Ok(()),
        }
    }

    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        if cx.current_element_is_sender() {
            return match &self.target {
                Target::Action(action) => cx.invoke(action),
                Target::PageName(page_name) => Ok(display_string(&cx.value(page_name))
                    .map(ActionResults::PageNamed)),
                Target::Href(_) => Ok(None),
            };
        }
        match self.content.as_deref() {
            Some(content) => content.invoke_action(cx),
            None => Ok(None),
        }
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        let href = match &self.target {
            Target::Href(href) => cx.value(href),
            Target::Action(_) | Target::PageName(_) => Value::String(cx.component_action_url()),
        };
        let mut attributes = vec![("href".to_string(), href)];
        attributes.extend(html::additional_attributes(cx, &self.attributes));

        cx.append_content_string(&html::start_tag("a", &attributes, false));
        if let Some(content) = self.content.as_deref() {
            content.append_to_response(cx)?;
        }
        cx.append_content_string("</a>");
        Ok(())
    }
}
