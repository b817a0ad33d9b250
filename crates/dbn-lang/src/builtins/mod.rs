//! Library sources run into the root frame before every program.

/// One preamble source and the name its errors are reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinSource {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builtins {
    sources: Vec<BuiltinSource>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::standard()
    }
}

impl Builtins {
    /// `letterA`..`letterZ` plus the shape commands and number helpers.
    pub fn standard() -> Self {
        Self::none()
            .with("letters.dbn", include_str!("letters.dbn"))
            .with("graphics.dbn", include_str!("graphics.dbn"))
    }

    pub fn none() -> Self {
        Self { sources: Vec::new() }
    }

    /// Appends a source; sources run in the order added.
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.sources.push(BuiltinSource { name: name.into(), text: text.into() });
        self
    }

    pub fn sources(&self) -> &[BuiltinSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::Stmt;
    use crate::parse;

    #[test]
    fn standard_sources_parse() {
        for src in Builtins::standard().sources() {
            let program = parse(&src.text, &src.name)
                .unwrap_or_else(|errs| panic!("{} failed to parse: {errs:?}", src.name));
            assert!(!program.body.is_empty(), "{} is empty", src.name);
        }
    }

    #[test]
    fn letters_cover_the_alphabet() {
        let builtins = Builtins::standard();
        let letters = &builtins.sources()[0];
        let program = parse(&letters.text, &letters.name).expect("letters parse");
        let names: Vec<String> = program.body.iter()
            .filter_map(|s| match s {
                Stmt::DefineCommand(def) => Some(def.name.clone()),
                _ => None,
            })
            .collect();
        let expected: Vec<String> = ('A'..='Z').map(|c| format!("letter{c}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn none_is_empty() {
        assert!(Builtins::none().is_empty());
        assert_eq!(Builtins::default(), Builtins::standard());
    }
}
