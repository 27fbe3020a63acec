use std::sync::Arc;

use serde_json::Value;

use super::html;
use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::association::Association;
use crate::component::ActionResults;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;

/// `<form>` that posts back to itself.
///
/// A form with several submit buttons leaves `action` unbound; the pressed
/// button is found among the form's children by its name in the submitted
/// values.
#[derive(Debug)]
pub struct Form {
    action: Option<Association>,
    attributes: Associations,
    content: Option<Arc<Element>>,
}

impl Form {
    pub fn new(
        _name: &str,
        mut associations: Associations,
        content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self {
            action: associations.remove("action"),
            attributes: associations,
            content,
        })
    }
}

impl DynamicElement for Form {
    fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        let Some(content) = self.content.as_deref() else {
            return Ok(());
        };
        cx.set_in_form(true);
        let result = content.take_values(cx);
        cx.set_in_form(false);
        result
    }

    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        if !cx.current_element_is_sender() {
            return Ok(None);
        }
        if let Some(action) = &self.action {
            return cx.invoke(action);
        }
        let Some(content) = self.content.as_deref() else {
            return Ok(None);
        };
        cx.set_in_form(true);
        let result = content.invoke_action(cx);
        cx.set_in_form(false);
        result
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        let mut attributes = vec![
            ("method".to_string(), Value::from("post")),
            ("action".to_string(), Value::String(cx.component_action_url())),
        ];
        attributes.extend(html::additional_attributes(cx, &self.attributes));
        cx.append_content_string(&html::start_tag("form", &attributes, false));

        cx.set_in_form(true);
        let result = match self.content.as_deref() {
            Some(content) => content.append_to_response(cx),
            None => Ok(()),
        };
        cx.set_in_form(false);
        result?;

        cx.append_content_string("</form>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::elements::testing::render;

    #[test]
    fn test_renders_post_form() {
        let (html, _) = render(
            r#"<wo:form id="login"><wo:textfield value="$name" /></wo:form>"#,
            json!({ "name": "Hugi" }),
        );
        assert_eq!(
            html,
            r#"<form method="post" action="/wo/1.0" id="login"><input type="text" name="0" value="Hugi"/></form>"#
        );
    }
}
