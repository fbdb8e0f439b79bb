use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    braced, bracketed,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    token::{Brace, Bracket},
    Ident, LitBool, LitStr, Path, Result, Token,
};

/// Declare a shape and generate a constructor for it.
///
/// This generates a function `<ident>() -> declarg::ShapeSpec`. Keys are
/// checked at compile time; naming rules (collisions, plain-args type) are
/// checked when the registry is built.
///
/// ```ignore
/// declarg::declare_shape!(tool_shape, {
///   name: "tool",
///   summary: "Example tool",
///   fields: [
///     { name: "verbose", help: "Be verbose" },
///     { name: "output", type: "text", short: ["o"], long: ["output", "out"], value_name: "FILE" },
///     { name: "size", type: "integer", mandatory: true },
///     { name: "files", kind: "plain-args" },
///     { name: "cache", kind: "ignored" },
///     { name: "build", kind: "subcommand", shape: build_shape },
///   ],
/// });
/// ```
///
/// `kind` defaults to `"option"` and `type` to `"bool"` (`"list<text>"` for
/// plain-args).
#[proc_macro]
pub fn declare_shape(input: TokenStream) -> TokenStream {
    let decl = parse_macro_input!(input as Decl);

    match expand_decl(decl) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct Decl {
    func_ident: Ident,
    _comma: Token![,],
    body: Object,
}

impl Parse for Decl {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            func_ident: input.parse()?,
            _comma: input.parse()?,
            body: input.parse()?,
        })
    }
}

struct Object {
    brace: Brace,
    entries: Punctuated<Entry, Token![,]>,
}

impl Parse for Object {
    fn parse(input: ParseStream) -> Result<Self> {
        let content;
        let brace = braced!(content in input);
        Ok(Self {
            brace,
            entries: content.parse_terminated(Entry::parse, Token![,])?,
        })
    }
}

struct Entry {
    key: Ident,
    _colon: Token![:],
    value: Value,
}

impl Parse for Entry {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            // `type` is a keyword; accept it as a key.
            key: input.call(Ident::parse_any)?,
            _colon: input.parse()?,
            value: input.parse()?,
        })
    }
}

enum Value {
    Str(LitStr),
    Bool(LitBool),
    StrArray(Span, Vec<LitStr>),
    ObjectArray(Span, Vec<Object>),
    Path(Path),
}

impl Value {
    fn span(&self) -> Span {
        match self {
            Self::Str(s) => s.span(),
            Self::Bool(b) => b.span,
            Self::StrArray(span, _) | Self::ObjectArray(span, _) => *span,
            Self::Path(p) => p
                .segments
                .first()
                .map(|s| s.ident.span())
                .unwrap_or_else(Span::call_site),
        }
    }
}

impl Parse for Value {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self::Str(input.parse()?));
        }
        if input.peek(LitBool) {
            return Ok(Self::Bool(input.parse()?));
        }
        if input.peek(Bracket) {
            let content;
            let bracket = bracketed!(content in input);
            let span = bracket.span.join();

            if content.is_empty() {
                return Ok(Self::StrArray(span, Vec::new()));
            }

            // `[ { .. }, { .. } ]` is a field list.
            if content.peek(Brace) {
                let elems: Punctuated<Object, Token![,]> =
                    content.parse_terminated(Object::parse, Token![,])?;
                return Ok(Self::ObjectArray(span, elems.into_iter().collect()));
            }

            let elems: Punctuated<LitStr, Token![,]> = content.parse_terminated(
                |p: ParseStream<'_>| p.parse::<LitStr>(),
                Token![,],
            )?;
            return Ok(Self::StrArray(span, elems.into_iter().collect()));
        }
        if input.peek(Ident) || input.peek(Token![::]) || input.peek(Token![crate]) {
            return Ok(Self::Path(input.parse()?));
        }

        Err(syn::Error::new(
            input.span(),
            "expected string literal, boolean literal, path, or [ ... ] array",
        ))
    }
}

#[derive(Default)]
struct ShapeDecl {
    name: Option<String>,
    summary: String,
    fields: Vec<FieldDecl>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Option,
    PlainArgs,
    Subcommand,
    Ignored,
    Synthetic,
}

enum TypeDecl {
    Bool,
    Text,
    Integer,
    Float,
    List(Box<TypeDecl>),
}

struct FieldDecl {
    name: String,
    kind: Kind,
    value_type: Option<TypeDecl>,
    short: Vec<String>,
    long: Vec<String>,
    mandatory: bool,
    help: String,
    value_name: Option<String>,
    shape: Option<Path>,
}

fn expand_decl(decl: Decl) -> Result<proc_macro2::TokenStream> {
    let mut spec = ShapeDecl::default();

    for entry in &decl.body.entries {
        let key = entry.key.to_string();
        match key.as_str() {
            "name" => spec.name = Some(expect_string_value(&entry.value)?),
            "summary" => spec.summary = expect_string_value(&entry.value)?,
            "fields" => spec.fields = expect_fields_value(&entry.value)?,
            other => {
                return Err(syn::Error::new(
                    entry.key.span(),
                    format!("unknown shape key: {other}"),
                ));
            }
        }
    }

    let Some(name) = spec.name else {
        return Err(syn::Error::new(
            decl.body.brace.span.join(),
            "missing required key: name",
        ));
    };

    let name_lit = LitStr::new(&name, Span::call_site());
    let summary_lit = LitStr::new(&spec.summary, Span::call_site());
    let fields: Vec<proc_macro2::TokenStream> = spec.fields.iter().map(field_expr).collect();
    let func_ident = decl.func_ident;

    Ok(quote! {
        pub fn #func_ident() -> ::declarg::metadata::ShapeSpec {
            ::declarg::metadata::ShapeSpec {
                name: (#name_lit).to_string(),
                summary: (#summary_lit).to_string(),
                fields: vec![ #(#fields),* ],
            }
        }
    })
}

fn field_expr(field: &FieldDecl) -> proc_macro2::TokenStream {
    let name = LitStr::new(&field.name, Span::call_site());
    let role = match field.kind {
        Kind::Ignored => quote! { ::declarg::metadata::FieldRole::Ignored },
        Kind::Synthetic => quote! { ::declarg::metadata::FieldRole::Synthetic },
        Kind::Subcommand => {
            let shape = &field.shape;
            quote! {
                ::declarg::metadata::FieldRole::Subcommand { shape: #shape() }
            }
        }
        Kind::PlainArgs => {
            let value_type = field
                .value_type
                .as_ref()
                .map(type_expr)
                .unwrap_or_else(|| type_expr(&TypeDecl::List(Box::new(TypeDecl::Text))));
            quote! {
                ::declarg::metadata::FieldRole::PlainArgs { value_type: #value_type }
            }
        }
        Kind::Option => {
            let value_type = field
                .value_type
                .as_ref()
                .map(type_expr)
                .unwrap_or_else(|| type_expr(&TypeDecl::Bool));
            let short = vec_expr(&field.short);
            let long = vec_expr(&field.long);
            let mandatory = field.mandatory;
            let help = LitStr::new(&field.help, Span::call_site());
            let value_name = opt_string_expr(field.value_name.as_deref());
            quote! {
                ::declarg::metadata::FieldRole::Option(::declarg::metadata::OptionSpec {
                    short: #short,
                    long: #long,
                    value_type: #value_type,
                    mandatory: #mandatory,
                    help: (#help).to_string(),
                    value_name: #value_name,
                })
            }
        }
    };

    quote! {
        ::declarg::metadata::FieldSpec {
            name: (#name).to_string(),
            role: #role,
        }
    }
}

fn type_expr(ty: &TypeDecl) -> proc_macro2::TokenStream {
    match ty {
        TypeDecl::Bool => quote! { ::declarg::metadata::ValueType::Bool },
        TypeDecl::Text => quote! { ::declarg::metadata::ValueType::Text },
        TypeDecl::Integer => quote! { ::declarg::metadata::ValueType::Integer },
        TypeDecl::Float => quote! { ::declarg::metadata::ValueType::Float },
        TypeDecl::List(inner) => {
            let inner = type_expr(inner);
            quote! { ::declarg::metadata::ValueType::List(::std::boxed::Box::new(#inner)) }
        }
    }
}

fn vec_expr(items: &[String]) -> proc_macro2::TokenStream {
    let lits: Vec<LitStr> = items
        .iter()
        .map(|s| LitStr::new(s, Span::call_site()))
        .collect();
    quote! { vec![ #( (#lits).to_string() ),* ] }
}

fn opt_string_expr(v: Option<&str>) -> proc_macro2::TokenStream {
    match v {
        Some(s) => {
            let lit = LitStr::new(s, Span::call_site());
            quote! { Some((#lit).to_string()) }
        }
        None => quote! { None },
    }
}

fn parse_type(raw: &str, span: Span) -> Result<TypeDecl> {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_prefix("list<").and_then(|r| r.strip_suffix('>')) {
        return Ok(TypeDecl::List(Box::new(parse_type(inner, span)?)));
    }
    match raw {
        "bool" => Ok(TypeDecl::Bool),
        "text" => Ok(TypeDecl::Text),
        "integer" => Ok(TypeDecl::Integer),
        "float" => Ok(TypeDecl::Float),
        other => Err(syn::Error::new(
            span,
            format!("unknown type: {other} (expected bool, text, integer, float or list<..>)"),
        )),
    }
}

fn parse_kind(raw: &str, span: Span) -> Result<Kind> {
    match raw {
        "option" => Ok(Kind::Option),
        "plain-args" => Ok(Kind::PlainArgs),
        "subcommand" => Ok(Kind::Subcommand),
        "ignored" => Ok(Kind::Ignored),
        "synthetic" => Ok(Kind::Synthetic),
        other => Err(syn::Error::new(
            span,
            format!("unknown kind: {other}"),
        )),
    }
}

fn expect_string_value(v: &Value) -> Result<String> {
    match v {
        Value::Str(s) => Ok(s.value()),
        _ => Err(syn::Error::new(v.span(), "expected string literal")),
    }
}

fn expect_bool_value(v: &Value) -> Result<bool> {
    match v {
        Value::Bool(b) => Ok(b.value()),
        _ => Err(syn::Error::new(v.span(), "expected boolean literal")),
    }
}

fn expect_string_array_value(v: &Value) -> Result<Vec<String>> {
    match v {
        Value::StrArray(_, items) => Ok(items.iter().map(|s| s.value()).collect()),
        _ => Err(syn::Error::new(v.span(), "expected [\"a\", \"b\"]")),
    }
}

fn expect_path_value(v: &Value) -> Result<Path> {
    match v {
        Value::Path(p) => Ok(p.clone()),
        _ => Err(syn::Error::new(
            v.span(),
            "expected the path of a shape function",
        )),
    }
}

fn expect_fields_value(v: &Value) -> Result<Vec<FieldDecl>> {
    match v {
        Value::ObjectArray(_, items) => items.iter().map(field_from_object).collect(),
        Value::StrArray(_, items) if items.is_empty() => Ok(Vec::new()),
        _ => Err(syn::Error::new(
            v.span(),
            "expected fields: [ { ... }, { ... } ]",
        )),
    }
}

fn field_from_object(obj: &Object) -> Result<FieldDecl> {
    let mut name = None;
    let mut kind = Kind::Option;
    let mut value_type = None;
    let mut short = Vec::new();
    let mut long = Vec::new();
    let mut mandatory = false;
    let mut help = String::new();
    let mut value_name = None;
    let mut shape = None;
    let mut type_key = None;
    // Keys that only make sense on options.
    let mut option_keys: Vec<&Ident> = Vec::new();

    for entry in &obj.entries {
        let key = entry.key.to_string();
        match key.as_str() {
            "name" => name = Some(expect_string_value(&entry.value)?),
            "kind" => kind = parse_kind(&expect_string_value(&entry.value)?, entry.value.span())?,
            "type" => {
                value_type = Some(parse_type(
                    &expect_string_value(&entry.value)?,
                    entry.value.span(),
                )?);
                type_key = Some(&entry.key);
            }
            "short" => {
                short = expect_string_array_value(&entry.value)?
                    .into_iter()
                    .map(|s| s.strip_prefix('-').map(str::to_string).unwrap_or(s))
                    .collect();
                option_keys.push(&entry.key);
            }
            "long" => {
                long = expect_string_array_value(&entry.value)?
                    .into_iter()
                    .map(|s| s.strip_prefix("--").map(str::to_string).unwrap_or(s))
                    .collect();
                option_keys.push(&entry.key);
            }
            "mandatory" => {
                mandatory = expect_bool_value(&entry.value)?;
                option_keys.push(&entry.key);
            }
            "help" => {
                help = expect_string_value(&entry.value)?;
                option_keys.push(&entry.key);
            }
            "value_name" => {
                value_name = Some(expect_string_value(&entry.value)?);
                option_keys.push(&entry.key);
            }
            "shape" => shape = Some((entry.key.clone(), expect_path_value(&entry.value)?)),
            other => {
                return Err(syn::Error::new(
                    entry.key.span(),
                    format!("unknown field key: {other}"),
                ));
            }
        }
    }

    let Some(name) = name else {
        return Err(syn::Error::new(
            obj.brace.span.join(),
            "field is missing required key: name",
        ));
    };

    if kind != Kind::Option {
        if let Some(key) = option_keys.first() {
            return Err(syn::Error::new(
                key.span(),
                format!("`{key}` is only allowed on options"),
            ));
        }
    }
    if let Some(key) = type_key {
        if !matches!(kind, Kind::Option | Kind::PlainArgs) {
            return Err(syn::Error::new(
                key.span(),
                "`type` is only allowed on options and plain-args",
            ));
        }
    }
    let shape = match (kind, shape) {
        (Kind::Subcommand, Some((_, path))) => Some(path),
        (Kind::Subcommand, None) => {
            return Err(syn::Error::new(
                obj.brace.span.join(),
                format!("subcommand '{name}' is missing key: shape"),
            ));
        }
        (_, Some((key, _))) => {
            return Err(syn::Error::new(
                key.span(),
                "`shape` is only allowed on subcommands",
            ));
        }
        (_, None) => None,
    };

    Ok(FieldDecl {
        name,
        kind,
        value_type,
        short,
        long,
        mandatory,
        help,
        value_name,
        shape,
    })
}
