use std::sync::Arc;

use super::required;
use super::Associations;
use super::DynamicElement;
use super::Element;
use crate::association::Association;
use crate::component::ActionResults;
use crate::context::Context;
use crate::error::BindingConfigurationError;
use crate::error::EngineError;

/// Prints the component action URL of its own position, for use in
/// attributes and scripts. Requests to that URL invoke `action`.
#[derive(Debug)]
pub struct ActionUrl {
    action: Association,
}

impl ActionUrl {
    pub fn new(
        name: &str,
        mut associations: Associations,
        _content: Option<Arc<Element>>,
    ) -> Result<Self, BindingConfigurationError> {
        Ok(Self {
            action: required(&mut associations, name, "action")?,
        })
    }
}

impl DynamicElement for ActionUrl {
    fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        if cx.current_element_is_sender() {
            return cx.invoke(&self.action);
        }
        Ok(None)
    }

    fn append_to_response(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        let url = cx.component_action_url();
        cx.append_content_string(&url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::component::ActionResults;
    use crate::elements::testing::render;
    use crate::elements::testing::submit;
    use crate::request::Request;

    const TEMPLATE: &str = r#"<button data-url="<wo:actionURL action="Next" />">Go</button>"#;

    #[test]
    fn test_prints_url() {
        let (html, _) = render(TEMPLATE, json!({}));
        assert_eq!(html, r#"<button data-url="/wo/1.1">Go</button>"#);
    }

    #[test]
    fn test_invokes_when_sender() {
        let request = Request::get("/wo/1.1");
        let (results, _) = submit(TEMPLATE, json!({}), &request, "1");
        assert!(matches!(results, Some(ActionResults::PageNamed(name)) if name == "Next"));

        let (results, _) = submit(TEMPLATE, json!({}), &request, "0");
        assert!(results.is_none());
    }
}
