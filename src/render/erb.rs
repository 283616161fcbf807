//! Built-in ERB-subset renderer
//!
//! Understands the expression tags BOSH job templates use most:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `<%= expr %>` | Evaluate and insert |
//! | `<%# ... %>` | Comment |
//! | `<%%` | Literal `<%` |
//! | `... -%>` | Drop the newline following the tag |
//!
//! Expressions are `spec.<field>`, `p("dotted.name")`,
//! `p("dotted.name", <literal>)` or a literal, optionally followed by
//! `.to_s` / `.to_json`. String literals may contain `%>`. Ruby code tags
//! (`<% ... %>`) are rejected.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;

use super::contract::{EvaluationContext, InstanceInfo, RendererFactory, TemplateRenderer};
use crate::domain::JobSpec;
use crate::storage::{load_job_spec, LoadError};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load job spec")]
    Spec(#[from] LoadError),

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: unsupported code tag '<% {code} %>'")]
    Unsupported { line: usize, code: String },

    #[error("line {line}: can't find property '{name}'")]
    UnknownProperty { line: usize, name: String },

    #[error("line {line}: unknown spec field '{field}'")]
    UnknownSpecField { line: usize, field: String },

    #[error("line {line}: failed to encode value as JSON")]
    Encode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Creates [`ErbRenderer`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ErbRendererFactory;

impl RendererFactory for ErbRendererFactory {
    type Renderer = ErbRenderer;

    fn create(
        &self,
        context: EvaluationContext,
        instance: InstanceInfo,
        spec_path: &Path,
    ) -> ErbRenderer {
        ErbRenderer::new(context, instance, spec_path)
    }
}

#[derive(Debug, Clone)]
pub struct ErbRenderer {
    context: EvaluationContext,
    instance: InstanceInfo,
    spec_path: PathBuf,
}

impl ErbRenderer {
    pub fn new(context: EvaluationContext, instance: InstanceInfo, spec_path: impl Into<PathBuf>) -> Self {
        Self {
            context,
            instance,
            spec_path: spec_path.into(),
        }
    }

    /// Evaluates a template string against this renderer's context
    pub fn evaluate(&self, template: &str, spec: &JobSpec) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(template.len());
        let mut pos = 0;

        while let Some(found) = template[pos..].find("<%") {
            let open = pos + found;
            out.push_str(&template[pos..open]);

            let body_start = open + 2;
            if template[body_start..].starts_with('%') {
                out.push_str("<%");
                pos = body_start + 1;
                continue;
            }

            let line = line_of(template, open);
            let close = find_close(&template[body_start..])
                .map(|i| body_start + i)
                .ok_or_else(|| TemplateError::Syntax {
                    line,
                    message: "unterminated tag".to_string(),
                })?;

            let mut tag = &template[body_start..close];
            pos = close + 2;
            if let Some(trimmed) = tag.strip_suffix('-') {
                tag = trimmed;
                if template[pos..].starts_with("\r\n") {
                    pos += 2;
                } else if template[pos..].starts_with('\n') {
                    pos += 1;
                }
            }

            if let Some(expr) = tag.strip_prefix('=') {
                let value = self.eval_expr(expr.trim(), spec, line)?;
                out.push_str(&value);
            } else if !tag.starts_with('#') {
                return Err(TemplateError::Unsupported {
                    line,
                    code: tag.trim_start_matches('-').trim().to_string(),
                });
            }
        }

        out.push_str(&template[pos..]);
        Ok(out)
    }

    fn eval_expr(&self, expr: &str, spec: &JobSpec, line: usize) -> Result<String, TemplateError> {
        let mut parser = ExprParser::new(expr, line);
        let mut value = self.eval_primary(&mut parser, spec)?;

        loop {
            parser.skip_ws();
            if parser.at_end() {
                break;
            }
            parser.expect('.')?;
            match parser.ident()? {
                "to_s" => value = Value::String(display(&value, line)?),
                "to_json" => {
                    let json = serde_json::to_string(&value)
                        .map_err(|source| TemplateError::Encode { line, source })?;
                    value = Value::String(json);
                }
                other => return Err(parser.error(format!("unsupported method '{}'", other))),
            }
        }

        display(&value, line)
    }

    fn eval_primary(&self, parser: &mut ExprParser<'_>, spec: &JobSpec) -> Result<Value, TemplateError> {
        parser.skip_ws();
        if parser.peek_ident() == Some("spec") {
            parser.ident()?;
            parser.expect('.')?;
            let field = parser.ident()?;
            return self.spec_field(field, parser.line).map(Value::String);
        }

        if parser.peek_ident() == Some("p") {
            parser.ident()?;
            parser.expect('(')?;
            let name = match parser.literal()? {
                Value::String(name) => name,
                _ => return Err(parser.error("property name must be a string".to_string())),
            };
            parser.skip_ws();
            let inline_default = if parser.eat(',') {
                Some(parser.literal()?)
            } else {
                None
            };
            parser.expect(')')?;

            return self
                .property(&name)
                .or_else(|| spec.default_for(&name).cloned())
                .or(inline_default)
                .ok_or(TemplateError::UnknownProperty {
                    line: parser.line,
                    name,
                });
        }

        parser.literal()
    }

    fn spec_field(&self, field: &str, line: usize) -> Result<String, TemplateError> {
        let value = match field {
            "address" | "ip" => &self.instance.address,
            "az" => &self.instance.az,
            "id" => &self.instance.id,
            "index" => &self.instance.index,
            "name" => &self.instance.name,
            _ => {
                return Err(TemplateError::UnknownSpecField {
                    line,
                    field: field.to_string(),
                })
            }
        };
        Ok(value.clone())
    }

    /// Looks up a dotted property name in the nested user properties.
    ///
    /// `nil` counts as unset.
    fn property(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.context.properties.get(name) {
            return Some(value.clone()).filter(|v| !v.is_null());
        }

        let mut segments = name.split('.');
        let mut current = self.context.properties.get(segments.next()?)?;
        for segment in segments {
            current = current.as_mapping()?.get(segment)?;
        }
        Some(current.clone()).filter(|v| !v.is_null())
    }
}

impl TemplateRenderer for ErbRenderer {
    fn render(&self, source: &Path, destination: &Path) -> Result<(), TemplateError> {
        let spec = load_job_spec(&self.spec_path)?;
        let template = fs::read_to_string(source).map_err(|e| TemplateError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;

        let rendered = self.evaluate(&template, &spec)?;

        fs::write(destination, rendered).map_err(|e| TemplateError::Write {
            path: destination.to_path_buf(),
            source: e,
        })
    }
}

/// Offset of the `%>` closing a tag body. Inside expression tags, quoted
/// string literals are skipped so they may contain `%>`.
fn find_close(body: &str) -> Option<usize> {
    if !body.starts_with('=') {
        return body.find("%>");
    }

    let mut quote = None;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if body[i..].starts_with("%>") => return Some(i),
            None => {}
        }
    }
    None
}

fn line_of(template: &str, offset: usize) -> usize {
    template[..offset].matches('\n').count() + 1
}

/// Ruby-style `to_s`: `nil` is empty, collections are JSON
fn display(value: &Value, line: usize) -> Result<String, TemplateError> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => return display(&tagged.value, line),
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(value)
            .map_err(|source| TemplateError::Encode { line, source })?,
    })
}

/// Cursor over a single tag expression
struct ExprParser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> ExprParser<'a> {
    fn new(src: &'a str, line: usize) -> Self {
        Self { src, pos: 0, line }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn error(&self, message: String) -> TemplateError {
        TemplateError::Syntax {
            line: self.line,
            message: format!("{} in '{}'", message, self.src),
        }
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), TemplateError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", c)))
        }
    }

    fn peek_ident(&self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let ident = &rest[..len];
        match ident.chars().next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => Some(ident),
            _ => None,
        }
    }

    fn ident(&mut self) -> Result<&'a str, TemplateError> {
        self.skip_ws();
        let ident = self
            .peek_ident()
            .ok_or_else(|| self.error("expected identifier".to_string()))?;
        self.pos += ident.len();
        Ok(ident)
    }

    fn literal(&mut self) -> Result<Value, TemplateError> {
        self.skip_ws();
        let rest = self.rest();
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => self.string(quote),
            Some(c) if c.is_ascii_digit() || c == '-' => {
                let len = rest
                    .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
                    .unwrap_or(rest.len());
                let text = &rest[..len];
                self.pos += len;
                serde_yaml::from_str::<Value>(text)
                    .ok()
                    .filter(Value::is_number)
                    .ok_or_else(|| self.error(format!("invalid number '{}'", text)))
            }
            _ => match self.ident()? {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "nil" => Ok(Value::Null),
                other => Err(self.error(format!("unsupported expression '{}'", other))),
            },
        }
    }

    fn string(&mut self, quote: char) -> Result<Value, TemplateError> {
        self.pos += 1;
        let mut value = String::new();
        let mut chars = self.rest().char_indices();

        while let Some((i, c)) = chars.next() {
            match c {
                c if c == quote => {
                    self.pos += i + 1;
                    return Ok(Value::String(value));
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) if quote == '"' => value.push('\n'),
                    Some((_, 't')) if quote == '"' => value.push('\t'),
                    Some((_, escaped)) if escaped == quote || escaped == '\\' => value.push(escaped),
                    Some((_, other)) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                },
                c => value.push(c),
            }
        }

        Err(self.error("unterminated string".to_string()))
    }
}
