//! Top-level dispatch and declaration parsing: classes, interfaces,
//! structs, enums, rich enums, typedefs, properties, functions, and
//! top-level variables.

use btrc_common::token::TokenKind;

use super::Parser;
use crate::ast::{
    Access, ClassDecl, ClassMember, Decl, EnumDecl, EnumValue, FieldDecl, FieldDef, FunctionDecl,
    InterfaceDecl, MethodDecl, MethodSig, PreprocessorDirective, PropertyDecl, RichEnumDecl,
    RichEnumVariant, StructDecl, TypedefDecl, TypeExpr, VarDeclStmt,
};
use crate::error::ParseError;

impl Parser {
    /// Dispatch one top-level item by first-token peek plus the `@gpu`
    /// and `keep` prefix flags. `@gpu` may attach only to functions.
    pub(crate) fn parse_top_level_item(&mut self) -> Result<Decl, ParseError> {
        if self.check(TokenKind::Preprocessor) {
            let tok = self.advance();
            return Ok(Decl::Preprocessor(PreprocessorDirective {
                text: tok.text,
                line: tok.line,
                col: tok.col,
            }));
        }

        let mut is_gpu = false;
        let mut keep_return = false;
        if self.check(TokenKind::AtGpu) {
            is_gpu = true;
            self.advance();
        }
        if self.check(TokenKind::Keep) {
            keep_return = true;
            self.advance();
        }
        let plain = !is_gpu && !keep_return;

        let kind = self.peek().kind;

        if kind == TokenKind::Interface && plain {
            return Ok(Decl::Interface(self.parse_interface_decl()?));
        }

        if kind == TokenKind::Abstract && plain && self.peek_at(1).kind == TokenKind::Class {
            return Ok(Decl::Class(self.parse_class_decl(true)?));
        }

        if kind == TokenKind::Class && plain && self.peek_at(1).kind == TokenKind::Ident {
            let after = self.peek_at(2).kind;
            if matches!(
                after,
                TokenKind::LBrace | TokenKind::Lt | TokenKind::Extends | TokenKind::Implements
            ) {
                return Ok(Decl::Class(self.parse_class_decl(false)?));
            }
        }

        if kind == TokenKind::Struct && plain {
            let next = self.peek_at(1).kind;
            if next == TokenKind::Ident {
                let after = self.peek_at(2).kind;
                if matches!(after, TokenKind::LBrace | TokenKind::Semicolon) {
                    return Ok(Decl::Struct(self.parse_struct_decl()?));
                }
            } else if next == TokenKind::LBrace {
                return Ok(Decl::Struct(self.parse_struct_decl()?));
            }
        }

        if kind == TokenKind::Enum && plain {
            if self.peek_at(1).kind == TokenKind::Class {
                return Ok(Decl::RichEnum(self.parse_rich_enum_decl()?));
            }
            return Ok(Decl::Enum(self.parse_enum_decl()?));
        }

        if kind == TokenKind::Typedef && plain {
            return Ok(Decl::Typedef(self.parse_typedef_decl()?));
        }

        if self.is_type_start() {
            return self.parse_function_or_var_decl(is_gpu, keep_return);
        }

        Err(self.error(format!(
            "Unexpected token '{}' at top level",
            self.peek().text
        )))
    }

    // ── Class declaration ──────────────────────────────────────────────

    fn parse_class_decl(&mut self, is_abstract: bool) -> Result<ClassDecl, ParseError> {
        if is_abstract {
            self.expect(TokenKind::Abstract, "'abstract'")?;
        }
        let tok = self.expect(TokenKind::Class, "'class'")?;
        let name = self.expect(TokenKind::Ident, "class name")?.text;

        let mut generic_params = Vec::new();
        if self.eat(TokenKind::Lt).is_some() {
            generic_params.push(self.expect(TokenKind::Ident, "generic param")?.text);
            while self.eat(TokenKind::Comma).is_some() {
                generic_params.push(self.expect(TokenKind::Ident, "generic param")?.text);
            }
            self.expect_gt()?;
        }

        let parent = if self.eat(TokenKind::Extends).is_some() {
            Some(self.expect(TokenKind::Ident, "parent class name")?.text)
        } else {
            None
        };

        let mut interfaces = Vec::new();
        if self.eat(TokenKind::Implements).is_some() {
            interfaces.push(self.expect(TokenKind::Ident, "interface name")?.text);
            while self.eat(TokenKind::Comma).is_some() {
                interfaces.push(self.expect(TokenKind::Ident, "interface name")?.text);
            }
        }

        self.expect(TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            members.push(self.parse_class_member(is_abstract)?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(ClassDecl {
            name,
            generic_params,
            members,
            parent,
            interfaces,
            is_abstract,
            line: tok.line,
            col: tok.col,
        })
    }

    /// Parse a class member: an access specifier followed by a field,
    /// method, or property. `allow_abstract` is set inside abstract
    /// classes.
    fn parse_class_member(&mut self, allow_abstract: bool) -> Result<ClassMember, ParseError> {
        let tok = self.peek().clone();

        let access = match tok.kind {
            TokenKind::Public => {
                self.advance();
                Access::Public
            }
            TokenKind::Private => {
                self.advance();
                Access::Private
            }
            TokenKind::Class | TokenKind::Static => {
                self.advance();
                Access::Class
            }
            _ => {
                return Err(self.error(format!(
                    "Expected access specifier (public/private/static), got '{}'",
                    tok.text
                )));
            }
        };

        let is_abstract_method = allow_abstract && self.eat(TokenKind::Abstract).is_some();
        let is_gpu = self.eat(TokenKind::AtGpu).is_some();
        let keep_return = self.eat(TokenKind::Keep).is_some();

        let ty = self.parse_type_expr()?;

        // Constructor: `(` directly after the type means the "type" was
        // actually the constructor name.
        if self.check(TokenKind::LParen) {
            let name = ty.base.clone();
            let method = self.parse_method_rest(
                access,
                ty,
                name,
                is_gpu,
                is_abstract_method,
                keep_return,
                tok.line,
                tok.col,
            )?;
            return Ok(ClassMember::Method(method));
        }

        let name = self.expect(TokenKind::Ident, "member name")?.text;

        if self.check(TokenKind::LParen) {
            let method = self.parse_method_rest(
                access,
                ty,
                name,
                is_gpu,
                is_abstract_method,
                keep_return,
                tok.line,
                tok.col,
            )?;
            Ok(ClassMember::Method(method))
        } else if self.check(TokenKind::LBrace) && self.is_property_start() {
            let prop = self.parse_property(access, ty, name, tok.line, tok.col)?;
            Ok(ClassMember::Property(prop))
        } else {
            let initializer = if self.eat(TokenKind::Eq).is_some() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(TokenKind::Semicolon, "';'")?;
            Ok(ClassMember::Field(FieldDecl {
                access,
                ty,
                name,
                initializer,
                line: tok.line,
                col: tok.col,
            }))
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_method_rest(
        &mut self,
        access: Access,
        return_type: TypeExpr,
        name: String,
        is_gpu: bool,
        is_abstract: bool,
        keep_return: bool,
        line: u32,
        col: u32,
    ) -> Result<MethodDecl, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = if is_abstract {
            self.expect(TokenKind::Semicolon, "';'")?;
            None
        } else {
            Some(self.parse_block()?)
        };
        Ok(MethodDecl {
            access,
            return_type,
            name,
            params,
            body,
            is_gpu,
            is_abstract,
            keep_return,
            line,
            col,
        })
    }

    // ── Properties ─────────────────────────────────────────────────────

    /// Whether `{` starts a property definition (next token is `get` or
    /// `set`).
    fn is_property_start(&self) -> bool {
        let next = self.peek_at(1);
        next.kind == TokenKind::Ident && (next.text == "get" || next.text == "set")
    }

    /// Parse a C#-style property: `type name { get; set; }` or
    /// `type name { get { ... } set { ... } }`.
    fn parse_property(
        &mut self,
        access: Access,
        ty: TypeExpr,
        name: String,
        line: u32,
        col: u32,
    ) -> Result<PropertyDecl, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut has_getter = false;
        let mut has_setter = false;
        let mut getter_body = None;
        let mut setter_body = None;

        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let tok = self.peek().clone();
            if tok.kind == TokenKind::Ident && tok.text == "get" {
                self.advance();
                has_getter = true;
                if self.eat(TokenKind::Semicolon).is_some() {
                    getter_body = None;
                } else if self.check(TokenKind::LBrace) {
                    getter_body = Some(self.parse_block()?);
                } else {
                    return Err(self.error("Expected ';' or '{' after 'get'"));
                }
            } else if tok.kind == TokenKind::Ident && tok.text == "set" {
                self.advance();
                has_setter = true;
                if self.eat(TokenKind::Semicolon).is_some() {
                    setter_body = None;
                } else if self.check(TokenKind::LBrace) {
                    setter_body = Some(self.parse_block()?);
                } else {
                    return Err(self.error("Expected ';' or '{' after 'set'"));
                }
            } else {
                return Err(self.error(format!(
                    "Expected 'get' or 'set' in property, got '{}'",
                    tok.text
                )));
            }
        }

        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(PropertyDecl {
            access,
            ty,
            name,
            has_getter,
            has_setter,
            getter_body,
            setter_body,
            line,
            col,
        })
    }

    // ── Struct declaration ─────────────────────────────────────────────

    fn parse_struct_decl(&mut self) -> Result<StructDecl, ParseError> {
        let tok = self.expect(TokenKind::Struct, "'struct'")?;
        let name = if self.check(TokenKind::Ident) {
            self.advance().text
        } else {
            String::new()
        };

        if self.eat(TokenKind::LBrace).is_some() {
            let mut fields = Vec::new();
            while !self.check(TokenKind::RBrace) && !self.at_end() {
                let mut ty = self.parse_type_expr()?;
                let fname = self.expect(TokenKind::Ident, "field name")?.text;
                if self.check(TokenKind::LBracket) {
                    self.advance();
                    if self.check(TokenKind::RBracket) {
                        self.advance();
                        ty.is_array = true;
                    } else {
                        let size = self.parse_expr()?;
                        self.expect(TokenKind::RBracket, "']'")?;
                        ty.is_array = true;
                        ty.array_size = Some(Box::new(size));
                    }
                }
                fields.push(FieldDef { ty, name: fname });
                self.expect(TokenKind::Semicolon, "';'")?;
            }
            self.expect(TokenKind::RBrace, "'}'")?;
            self.expect(TokenKind::Semicolon, "';'")?;
            Ok(StructDecl {
                name,
                fields,
                line: tok.line,
                col: tok.col,
            })
        } else {
            self.expect(TokenKind::Semicolon, "';'")?;
            Ok(StructDecl {
                name,
                fields: Vec::new(),
                line: tok.line,
                col: tok.col,
            })
        }
    }

    // ── Interface declaration ──────────────────────────────────────────

    fn parse_interface_decl(&mut self) -> Result<InterfaceDecl, ParseError> {
        let tok = self.expect(TokenKind::Interface, "'interface'")?;
        let name = self.expect(TokenKind::Ident, "interface name")?.text;

        let mut generic_params = Vec::new();
        if self.eat(TokenKind::Lt).is_some() {
            generic_params.push(self.expect(TokenKind::Ident, "generic param")?.text);
            while self.eat(TokenKind::Comma).is_some() {
                generic_params.push(self.expect(TokenKind::Ident, "generic param")?.text);
            }
            self.expect_gt()?;
        }

        let parent = if self.eat(TokenKind::Extends).is_some() {
            Some(self.expect(TokenKind::Ident, "parent interface name")?.text)
        } else {
            None
        };

        self.expect(TokenKind::LBrace, "'{'")?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let sig_tok = self.peek().clone();
            let keep_return = self.eat(TokenKind::Keep).is_some();
            let return_type = self.parse_type_expr()?;
            let mname = self.expect(TokenKind::Ident, "method name")?.text;
            self.expect(TokenKind::LParen, "'('")?;
            let params = self.parse_param_list()?;
            self.expect(TokenKind::RParen, "')'")?;
            self.expect(TokenKind::Semicolon, "';'")?;
            methods.push(MethodSig {
                return_type,
                name: mname,
                params,
                keep_return,
                line: sig_tok.line,
                col: sig_tok.col,
            });
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(InterfaceDecl {
            name,
            methods,
            parent,
            generic_params,
            line: tok.line,
            col: tok.col,
        })
    }

    // ── Enum declarations ──────────────────────────────────────────────

    fn parse_enum_decl(&mut self) -> Result<EnumDecl, ParseError> {
        let tok = self.expect(TokenKind::Enum, "'enum'")?;
        let name = if self.check(TokenKind::Ident) {
            self.advance().text
        } else {
            String::new()
        };
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut values = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let vname = self.expect(TokenKind::Ident, "enum value")?.text;
            let value = if self.eat(TokenKind::Eq).is_some() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            values.push(EnumValue { name: vname, value });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(EnumDecl {
            name,
            values,
            line: tok.line,
            col: tok.col,
        })
    }

    /// Parse a rich enum: `enum class Name { Variant(type name), ... }`.
    fn parse_rich_enum_decl(&mut self) -> Result<RichEnumDecl, ParseError> {
        let tok = self.expect(TokenKind::Enum, "'enum'")?;
        self.expect(TokenKind::Class, "'class'")?;
        let name = self.expect(TokenKind::Ident, "enum name")?.text;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut variants = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let vname = self.expect(TokenKind::Ident, "variant name")?.text;
            let mut params = Vec::new();
            if self.eat(TokenKind::LParen).is_some() {
                if !self.check(TokenKind::RParen) {
                    params = self.parse_param_list()?;
                }
                self.expect(TokenKind::RParen, "')'")?;
            }
            variants.push(RichEnumVariant {
                name: vname,
                params,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(RichEnumDecl {
            name,
            variants,
            line: tok.line,
            col: tok.col,
        })
    }

    // ── Typedef declaration ────────────────────────────────────────────

    fn parse_typedef_decl(&mut self) -> Result<TypedefDecl, ParseError> {
        let tok = self.expect(TokenKind::Typedef, "'typedef'")?;
        let original = self.parse_type_expr()?;
        let alias = self.expect(TokenKind::Ident, "typedef alias")?.text;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(TypedefDecl {
            original,
            alias,
            line: tok.line,
            col: tok.col,
        })
    }

    // ── Function or top-level variable ─────────────────────────────────

    /// Disambiguate a function from a top-level variable declaration.
    fn parse_function_or_var_decl(
        &mut self,
        is_gpu: bool,
        keep_return: bool,
    ) -> Result<Decl, ParseError> {
        let start = self.peek().clone();

        if self.check(TokenKind::Var) {
            if is_gpu {
                return Err(self.error("@gpu cannot be applied to variables"));
            }
            if keep_return {
                return Err(self.error("'keep' cannot be applied to variable declarations"));
            }
            self.advance();
            let name = self.expect(TokenKind::Ident, "variable name")?.text;
            self.expect(TokenKind::Eq, "'=' (var requires an initializer)")?;
            let initializer = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "';'")?;
            return Ok(Decl::Var(VarDeclStmt {
                ty: None,
                name,
                initializer: Some(initializer),
                line: start.line,
                col: start.col,
            }));
        }

        let return_type = self.parse_type_expr()?;
        let name = self.expect(TokenKind::Ident, "name")?.text;

        if self.check(TokenKind::LParen) {
            self.expect(TokenKind::LParen, "'('")?;
            let params = self.parse_param_list()?;
            self.expect(TokenKind::RParen, "')'")?;
            // A body-less declaration is a forward declaration.
            let body = if self.eat(TokenKind::Semicolon).is_some() {
                None
            } else {
                Some(self.parse_block()?)
            };
            Ok(Decl::Function(FunctionDecl {
                return_type,
                name,
                params,
                body,
                is_gpu,
                keep_return,
                line: start.line,
                col: start.col,
            }))
        } else {
            if is_gpu {
                return Err(self.error("@gpu cannot be applied to variables"));
            }
            if keep_return {
                return Err(self.error("'keep' cannot be applied to variable declarations"));
            }
            let initializer = if self.eat(TokenKind::Eq).is_some() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(TokenKind::Semicolon, "';'")?;
            Ok(Decl::Var(VarDeclStmt {
                ty: Some(return_type),
                name,
                initializer,
                line: start.line,
                col: start.col,
            }))
        }
    }
}
