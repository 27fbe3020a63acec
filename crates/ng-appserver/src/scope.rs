use crate::component::ComponentInstance;
use crate::error::StateError;

#[derive(Debug)]
struct Frame {
    key: String,
    instance: ComponentInstance,
}

/// The chain of component instances from the page down to the component
/// whose template is being visited.
///
/// Depth 0 is the page. Entered children are moved out of their parent's
/// child map for the duration of the visit and put back on [`leave`].
///
/// [`leave`]: ComponentScope::leave
#[derive(Debug)]
pub struct ComponentScope<'r> {
    root: &'r mut ComponentInstance,
    frames: Vec<Frame>,
    suspended: Vec<Frame>,
}

impl<'r> ComponentScope<'r> {
    pub fn new(root: &'r mut ComponentInstance) -> Self {
        Self {
            root,
            frames: Vec::new(),
            suspended: Vec::new(),
        }
    }

    /// Depth of the current component.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn get(&self, depth: usize) -> Option<&ComponentInstance> {
        match depth.checked_sub(1) {
            None => Some(&*self.root),
            Some(index) => self.frames.get(index).map(|frame| &frame.instance),
        }
    }

    pub fn get_mut(&mut self, depth: usize) -> Option<&mut ComponentInstance> {
        match depth.checked_sub(1) {
            None => Some(&mut *self.root),
            Some(index) => self.frames.get_mut(index).map(|frame| &mut frame.instance),
        }
    }

    #[must_use]
    pub fn current(&self) -> &ComponentInstance {
        self.frames.last().map_or(&*self.root, |frame| &frame.instance)
    }

    pub fn current_mut(&mut self) -> &mut ComponentInstance {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.instance,
            None => &mut *self.root,
        }
    }

    /// Take the current component's child stored under `key`, if it has one.
    pub fn take_child(&mut self, key: &str) -> Option<ComponentInstance> {
        self.current_mut().children.remove(key)
    }

    pub fn enter(&mut self, key: String, instance: ComponentInstance) {
        self.frames.push(Frame { key, instance });
    }

    /// Pop the current component and hand it back to its parent.
    pub fn leave(&mut self) -> Result<(), StateError> {
        let frame = self.frames.pop().ok_or(StateError::ScopeUnderflow)?;
        self.current_mut()
            .children
            .insert(frame.key, frame.instance);
        Ok(())
    }

    /// Step out to the parent without handing the current component back.
    pub fn suspend(&mut self) -> Result<(), StateError> {
        let frame = self.frames.pop().ok_or(StateError::ScopeUnderflow)?;
        self.suspended.push(frame);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), StateError> {
        let frame = self.suspended.pop().ok_or(StateError::ScopeUnderflow)?;
        self.frames.push(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::component::MapComponent;
    use crate::template::Template;

    fn instance(name: &str) -> ComponentInstance {
        ComponentInstance::new(
            name,
            Box::new(MapComponent::default()),
            Arc::new(Template::empty(name)),
        )
    }

    #[test]
    fn test_enter_and_leave_reinserts_child() {
        let mut page = instance("Page");
        {
            let mut scope = ComponentScope::new(&mut page);
            assert_eq!(scope.depth(), 0);
            scope.enter("0.1".to_string(), instance("Child"));
            assert_eq!(scope.depth(), 1);
            assert_eq!(scope.current().name(), "Child");
            assert_eq!(scope.get(0).map(ComponentInstance::name), Some("Page"));
            scope.leave().unwrap();
            assert_eq!(scope.current().name(), "Page");
        }
        assert_eq!(page.child("0.1").map(ComponentInstance::name), Some("Child"));
    }

    #[test]
    fn test_take_child_moves_out() {
        let mut page = instance("Page");
        page.children.insert("0".to_string(), instance("Child"));
        let mut scope = ComponentScope::new(&mut page);
        let child = scope.take_child("0").unwrap();
        assert_eq!(child.name(), "Child");
        assert!(scope.take_child("0").is_none());
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut page = instance("Page");
        let mut scope = ComponentScope::new(&mut page);
        scope.enter("0".to_string(), instance("Child"));
        scope.suspend().unwrap();
        assert_eq!(scope.current().name(), "Page");
        scope.resume().unwrap();
        assert_eq!(scope.current().name(), "Child");
    }

    #[test]
    fn test_underflow() {
        let mut page = instance("Page");
        let mut scope = ComponentScope::new(&mut page);
        assert_eq!(scope.leave(), Err(StateError::ScopeUnderflow));
        assert_eq!(scope.suspend(), Err(StateError::ScopeUnderflow));
        assert_eq!(scope.resume(), Err(StateError::ScopeUnderflow));
    }
}
