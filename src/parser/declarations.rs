//! Declaration parsing implementation
//!
//! # Grammar
//!
//! ```text
//! item        ::= namespace | alias | struct | ";"
//! namespace   ::= "namespace" identifier ("::" identifier)* "{" item* "}"
//! alias       ::= "using" identifier "=" type_name ";"
//! struct      ::= ("struct" | "class") alignas? identifier marker* "{" member* "}" ";"?
//! member      ::= access ":" | type_name identifier marker* ";"
//! type_name   ::= "::"? identifier ("::" identifier)*
//! marker      ::= SEMANTIC "(" identifier ")"
//!               | REGISTER "(" integer ")"
//!               | INSTANCE_DATA "(" integer ")"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::interpreter::constants::MAX_STRUCT_ALIGNMENT;
use crate::parser::ast::*;
use crate::parser::lexer::{TokenKind, INSTANCE_DATA_MARKER, REGISTER_MARKER, SEMANTIC_MARKER};
use crate::parser::parse::{ParseError, Parser};
use tracing::warn;

impl Parser {
    /// Parse one item at file or namespace scope
    pub(crate) fn parse_item(
        &mut self,
        namespace: &mut Vec<String>,
        program: &mut Program,
    ) -> Result<(), ParseError> {
        if self.check_keyword("namespace") {
            self.advance();
            return self.parse_namespace(namespace, program);
        }

        if self.check_keyword("using") {
            self.advance();
            let alias = self.parse_alias(namespace)?;
            program.declarations.push(Declaration::Alias(alias));
            return Ok(());
        }

        if self.check_keyword("struct") || self.check_keyword("class") {
            self.advance();
            if let Some(decl) = self.parse_struct(namespace)? {
                program.declarations.push(Declaration::Struct(decl));
            }
            return Ok(());
        }

        // Stray terminators are legal C++ at namespace scope
        if self.match_punct(";") {
            return Ok(());
        }

        Err(self.error("'namespace', 'using', 'struct' or 'class'"))
    }

    /// Parse `namespace a::b { ... }` after the keyword
    pub(crate) fn parse_namespace(
        &mut self,
        namespace: &mut Vec<String>,
        program: &mut Program,
    ) -> Result<(), ParseError> {
        let depth = namespace.len();

        namespace.push(self.expect_identifier("after 'namespace'")?.text);
        while self.match_punct("::") {
            namespace.push(self.expect_identifier("after '::'")?.text);
        }

        self.expect_grouper('{', "after namespace name")?;
        while !self.check_grouper('}') {
            if self.is_at_end() {
                return Err(self.error("'}' to close namespace"));
            }
            self.parse_item(namespace, program)?;
        }
        self.expect_grouper('}', "to close namespace")?;

        namespace.truncate(depth);
        Ok(())
    }

    /// Parse `using Alias = Target;` after the keyword
    pub(crate) fn parse_alias(&mut self, namespace: &[String]) -> Result<AliasDecl, ParseError> {
        let name = self.expect_identifier("after 'using'")?;
        self.expect_punct("=", "after alias name")?;
        let target = self.parse_type_name()?;
        self.expect_punct(";", "after alias declaration")?;

        Ok(AliasDecl {
            alias: name.text,
            namespace: namespace.to_vec(),
            target,
            location: name.location,
        })
    }

    /// Parse a struct or class after its keyword.
    ///
    /// Returns `None` for a forward declaration.
    pub(crate) fn parse_struct(
        &mut self,
        namespace: &[String],
    ) -> Result<Option<StructDecl>, ParseError> {
        let mut alignment = None;
        if self.check_keyword("alignas") {
            self.advance();
            self.expect_grouper('(', "after 'alignas'")?;
            let token = self.peek().clone();
            let value = self.expect_integer("in 'alignas'")?;
            if !value.is_power_of_two() || value > MAX_STRUCT_ALIGNMENT {
                return Err(ParseError {
                    expected: format!(
                        "power-of-two alignment up to {} in 'alignas'",
                        MAX_STRUCT_ALIGNMENT
                    ),
                    found: token.to_string(),
                    location: token.location,
                });
            }
            alignment = Some(value);
            self.expect_grouper(')', "after alignment")?;
        }

        let name = self.expect_identifier("after 'struct'")?;

        let mut register = None;
        for annotation in self.parse_markers()? {
            match annotation {
                Annotation::Register(n) => register = Some(n),
                Annotation::Semantic(_) | Annotation::InstanceData(_) => {
                    let found = if matches!(annotation, Annotation::Semantic(_)) {
                        SEMANTIC_MARKER
                    } else {
                        INSTANCE_DATA_MARKER
                    };
                    return Err(ParseError {
                        expected: format!("only {} on a struct", REGISTER_MARKER),
                        found: found.to_string(),
                        location: name.location,
                    });
                }
            }
        }

        if self.check_punct(";") && alignment.is_none() && register.is_none() {
            self.advance();
            warn!(name = %name.text, "ignoring forward declaration");
            return Ok(None);
        }

        self.expect_grouper('{', "after struct name")?;

        let mut fields = Vec::new();
        while !self.check_grouper('}') {
            if self.is_at_end() {
                return Err(self.error("'}' after struct fields"));
            }
            if let Some(field) = self.parse_member()? {
                fields.push(field);
            }
        }

        self.expect_grouper('}', "after struct fields")?;
        self.match_punct(";");

        Ok(Some(StructDecl {
            name: name.text,
            namespace: namespace.to_vec(),
            alignment,
            register,
            fields,
            location: name.location,
        }))
    }

    /// Parse a field declaration, or skip an access specifier
    pub(crate) fn parse_member(&mut self) -> Result<Option<FieldDecl>, ParseError> {
        let access = ["public", "private", "protected"];
        if access.iter().any(|keyword| self.check_keyword(keyword)) {
            self.advance();
            self.expect_punct(":", "after access specifier")?;
            return Ok(None);
        }

        let field_type = self.parse_type_name()?;
        let name = self.expect_identifier("for field name")?;
        let annotations = self.parse_markers()?;
        self.expect_punct(";", "after struct field")?;

        Ok(Some(FieldDecl {
            name: name.text,
            field_type,
            annotations,
            location: name.location,
        }))
    }

    /// Parse a possibly qualified type name
    pub(crate) fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        let location = self.current_location();
        let mut segments = Vec::new();

        // A leading `::` names the global namespace and adds nothing to the path
        self.match_punct("::");

        segments.push(self.expect_identifier("for type name")?.text);
        while self.match_punct("::") {
            segments.push(self.expect_identifier("after '::'")?.text);
        }

        Ok(TypeName { segments, location })
    }

    /// Parse zero or more marker macros
    pub(crate) fn parse_markers(&mut self) -> Result<Vec<Annotation>, ParseError> {
        let mut annotations = Vec::new();

        while self.peek().kind == TokenKind::Identifier {
            let is_marker = matches!(
                self.peek().text.as_str(),
                SEMANTIC_MARKER | REGISTER_MARKER | INSTANCE_DATA_MARKER
            );
            if !is_marker {
                break;
            }
            let marker = self.advance();

            self.expect_grouper('(', &format!("after {}", marker.text))?;
            let annotation = match marker.text.as_str() {
                SEMANTIC_MARKER => {
                    Annotation::Semantic(self.expect_identifier("in SEMANTIC marker")?.text)
                }
                REGISTER_MARKER => Annotation::Register(self.expect_integer("in REGISTER marker")?),
                _ => Annotation::InstanceData(self.expect_integer("in INSTANCE_DATA marker")?),
            };
            self.expect_grouper(')', &format!("to close {}", marker.text))?;

            annotations.push(annotation);
        }

        Ok(annotations)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::from_source(source).expect("lexing failed");
        parser.parse_program().expect("parsing failed")
    }

    #[test]
    fn test_struct_with_markers() {
        let program = parse(
            r#"
            namespace Shaders {
                struct VS_Instance REGISTER(2) {
                    float4 _position SEMANTIC(SV_Position);
                    float4x4 _world REGISTER(1) INSTANCE_DATA(1);
                };
            }
            "#,
        );

        let s = program.structs().next().unwrap();
        assert_eq!(s.name, "VS_Instance");
        assert_eq!(s.qualified_name(), "Shaders::VS_Instance");
        assert_eq!(s.register, Some(2));
        assert_eq!(s.fields.len(), 2);
        assert_eq!(s.fields[0].semantic(), Some("SV_Position"));
        assert_eq!(s.fields[1].register(), Some(1));
        assert_eq!(s.fields[1].instance_step_rate(), Some(1));
    }

    #[test]
    fn test_alias_and_qualified_types() {
        let program = parse(
            r#"
            namespace gfx::cb {
                using vec4 = ::DirectX::XMFLOAT4;
                class alignas(16) Light {
                public:
                    vec4 _color;
                    DirectX::XMFLOAT3 _dir;
                };
            }
            "#,
        );

        let alias = program.aliases().next().unwrap();
        assert_eq!(alias.alias, "vec4");
        assert_eq!(alias.target.qualified(), "DirectX::XMFLOAT4");
        assert_eq!(alias.namespace, vec!["gfx", "cb"]);

        let s = program.structs().next().unwrap();
        assert_eq!(s.alignment, Some(16));
        assert_eq!(s.fields[1].field_type.base(), "XMFLOAT3");
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let program =
            parse("struct A { float a; float b; float c; }; using X = float; struct B {};");
        let kinds: Vec<bool> = program
            .declarations
            .iter()
            .map(|d| matches!(d, Declaration::Struct(_)))
            .collect();
        assert_eq!(kinds, vec![true, false, true]);
        let first = program.structs().next().unwrap();
        let names: Vec<&str> = first.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_forward_declaration_is_skipped() {
        let program = parse("struct Later; struct Now { int x; };");
        assert_eq!(program.structs().count(), 1);
    }

    #[test]
    fn test_missing_semicolon_after_field() {
        let mut parser = Parser::from_source("struct S { float4 a float4 b; };").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert_eq!(err.expected, "';' after struct field");
        assert_eq!(err.found, "identifier 'float4'");
    }

    #[test]
    fn test_bad_marker_argument() {
        let mut parser = Parser::from_source("struct S { int a REGISTER(x); };").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert_eq!(err.expected, "non-negative integer in REGISTER marker");
    }

    #[test]
    fn test_semantic_marker_rejected_on_struct() {
        let mut parser = Parser::from_source("struct S SEMANTIC(X) { int a; };").unwrap();
        assert!(parser.parse_program().is_err());
    }

    #[test]
    fn test_alignas_must_be_power_of_two() {
        for source in [
            "struct alignas(0) S { float a; };",
            "struct alignas(24) S { float a; };",
            "struct alignas(2147483648) S { float a; };",
        ] {
            let mut parser = Parser::from_source(source).unwrap();
            let err = parser.parse_program().unwrap_err();
            assert_eq!(err.expected, "power-of-two alignment up to 256 in 'alignas'");
            assert_eq!(err.location.offset, 15);
        }

        let mut parser = Parser::from_source("struct alignas(24) S {};").unwrap();
        assert_eq!(parser.parse_program().unwrap_err().found, "integer literal '24'");

        let program = parse("struct alignas(256) S { float a; };");
        assert_eq!(program.structs().next().unwrap().alignment, Some(256));
    }
}
