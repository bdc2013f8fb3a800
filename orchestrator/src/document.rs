use crate::error::Result;

/// A `<script>` element as the orchestrator emits it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptElement {
    pub script_type: Option<String>,
    pub src: Option<String>,
    pub cross_origin: Option<String>,
    pub text: Option<String>,
}

impl ScriptElement {
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn external(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, script_type: impl Into<String>) -> Self {
        self.script_type = Some(script_type.into());
        self
    }

    pub fn with_cross_origin(mut self, cross_origin: impl Into<String>) -> Self {
        self.cross_origin = Some(cross_origin.into());
        self
    }
}

/// The document head the orchestrator appends to.
pub trait Document {
    fn append_to_head(&mut self, script: &ScriptElement) -> Result<()>;
}

/// In-memory head standing in for the browser document.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct HeadBuffer {
    scripts: Vec<ScriptElement>,
}

#[cfg(test)]
impl HeadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripts(&self) -> &[ScriptElement] {
        &self.scripts
    }
}

#[cfg(test)]
impl Document for HeadBuffer {
    fn append_to_head(&mut self, script: &ScriptElement) -> Result<()> {
        self.scripts.push(script.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_script_has_only_src() {
        let script = ScriptElement::external("/en/~partytown/partytown.js");
        assert_eq!(script.src.as_deref(), Some("/en/~partytown/partytown.js"));
        assert_eq!(script.text, None);
        assert_eq!(script.script_type, None);
        assert_eq!(script.cross_origin, None);
    }

    #[test]
    fn test_inline_script_builder() {
        let script = ScriptElement::inline("var a = 1;")
            .with_type("text/partytown")
            .with_cross_origin("anonymous");
        assert_eq!(script.text.as_deref(), Some("var a = 1;"));
        assert_eq!(script.script_type.as_deref(), Some("text/partytown"));
        assert_eq!(script.cross_origin.as_deref(), Some("anonymous"));
        assert_eq!(script.src, None);
    }

    #[test]
    fn test_head_buffer_keeps_append_order() {
        let mut head = HeadBuffer::new();
        head.append_to_head(&ScriptElement::inline("first")).unwrap();
        head.append_to_head(&ScriptElement::external("/second.js")).unwrap();

        assert_eq!(head.scripts().len(), 2);
        assert_eq!(head.scripts()[0].text.as_deref(), Some("first"));
        assert_eq!(head.scripts()[1].src.as_deref(), Some("/second.js"));
    }
}
