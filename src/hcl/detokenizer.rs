//! Detokenizer for HCL token streams
//!
//! Converts a stream of tokens back into a string. Every token carries its own leading
//! whitespace, so no layout decisions are made here: printing is concatenation.

use super::token::Token;

/// Trait for converting a token to its source representation
pub trait ToHclString {
    fn to_hcl_string(&self) -> String;
}

impl ToHclString for Token {
    fn to_hcl_string(&self) -> String {
        format!("{}{}", self.lead, self.text)
    }
}

/// Detokenize a stream of tokens into a string
pub fn detokenize(tokens: &[Token]) -> String {
    let mut result = String::with_capacity(tokens.iter().map(|t| t.lead.len() + t.text.len()).sum());
    for token in tokens {
        result.push_str(&token.lead);
        result.push_str(&token.text);
    }
    result
}
