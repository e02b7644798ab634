//! Classification of directive tokens

/// What a `#name` token asks the preprocessor to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Include,
    Define,
    Undef,
    /// Any directive name that isn't recognized
    Invalid(String),
}

impl Directive {
    /// Classifies a directive by its name, without the leading `#`
    pub fn classify(name: &str) -> Self {
        match name {
            "include" => Directive::Include,
            "define" => Directive::Define,
            "undef" => Directive::Undef,
            other => Directive::Invalid(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Directive::Include => "include",
            Directive::Define => "define",
            Directive::Undef => "undef",
            Directive::Invalid(name) => name,
        }
    }
}
