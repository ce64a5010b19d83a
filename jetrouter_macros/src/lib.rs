use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr, Result as SynResult};

#[derive(Default)]
struct FieldOpts {
    args: bool,
    name: Option<String>,
    /// `Some(None)` for a bare `has`, `Some(Some(name))` for `has = "name"`.
    has: Option<Option<String>>,
    default: bool,
    flatten: bool,
    skip: bool,
}

fn parse_field_opts(field: &syn::Field) -> SynResult<FieldOpts> {
    let mut opts = FieldOpts::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("param")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("args") {
                opts.args = true;
            } else if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                opts.name = Some(lit.value());
            } else if meta.path.is_ident("has") {
                if meta.input.peek(syn::Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    opts.has = Some(Some(lit.value()));
                } else {
                    opts.has = Some(None);
                }
            } else if meta.path.is_ident("default") {
                opts.default = true;
            } else if meta.path.is_ident("flatten") {
                opts.flatten = true;
            } else if meta.path.is_ident("skip") {
                opts.skip = true;
            } else {
                let option = meta
                    .path
                    .get_ident()
                    .map(Ident::to_string)
                    .unwrap_or_default();
                return Err(meta.error(format!("unknown param option `{option}`")));
            }
            Ok(())
        })?;
    }
    if opts.args && (opts.name.is_some() || opts.has.is_some() || opts.flatten || opts.default) {
        return Err(syn::Error::new_spanned(
            field,
            "`args` cannot be combined with other param options",
        ));
    }
    if opts.flatten && (opts.name.is_some() || opts.has.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "`flatten` cannot be combined with `name` or `has`",
        ));
    }
    Ok(opts)
}

/// Derive `jetrouter::params::RequestParams` for a struct with named fields.
///
/// Every field binds from the query (or form) value named after it unless
/// marked otherwise with `#[param(...)]`.
#[proc_macro_derive(RequestParams, attributes(param))]
pub fn derive_request_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> SynResult<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "RequestParams can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "RequestParams can only be derived for structs",
            ))
        }
    };

    let mut parsed = Vec::with_capacity(fields.len());
    for field in fields {
        let field_ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        parsed.push((field_ident, parse_field_opts(field)?, field));
    }

    let field_names: Vec<String> = parsed.iter().map(|(i, _, _)| i.to_string()).collect();
    let mut companions = Vec::new();
    let mut args_field = None;
    for (field_ident, opts, field) in &parsed {
        if opts.args {
            if args_field.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked `#[param(args)]`",
                ));
            }
            args_field = Some(field_ident.clone());
        }
        if let Some(has) = &opts.has {
            let companion = has
                .clone()
                .unwrap_or_else(|| format!("has_{field_ident}"));
            if !field_names.contains(&companion) {
                return Err(syn::Error::new_spanned(
                    field,
                    format!("presence companion `{companion}` is not a field of this struct"),
                ));
            }
            companions.push(companion);
        }
    }

    let mut binds = Vec::new();
    for (field_ident, opts, _) in &parsed {
        let field_name = field_ident.to_string();
        if opts.args || opts.skip || companions.contains(&field_name) {
            continue;
        }
        if opts.flatten {
            binds.push(quote! {
                ::jetrouter::params::RequestParams::bind(&mut self.#field_ident, source)?;
            });
            continue;
        }
        let name = opts.name.clone().unwrap_or(field_name);
        let keep = opts.default;
        let bind = quote! {
            ::jetrouter::params::bind_field(&mut self.#field_ident, #name, source, #keep)?
        };
        match &opts.has {
            Some(has) => {
                let companion = format_ident!(
                    "{}",
                    has.clone().unwrap_or_else(|| format!("has_{field_ident}"))
                );
                binds.push(quote! { self.#companion = #bind; });
            }
            None => binds.push(quote! { #bind; }),
        }
    }

    let positional = args_field.map(|field_ident| {
        quote! {
            fn positional_args(&mut self) -> ::core::option::Option<&mut ::std::vec::Vec<::std::string::String>> {
                ::core::option::Option::Some(&mut self.#field_ident)
            }
        }
    });
    let field_count = parsed.len();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::jetrouter::params::RequestParams for #ident #ty_generics #where_clause {
            #positional

            fn field_count() -> usize {
                #field_count
            }

            fn bind(
                &mut self,
                source: &dyn ::jetrouter::params::ValueSource,
            ) -> ::core::result::Result<(), ::jetrouter::params::ParseError> {
                #(#binds)*
                ::core::result::Result::Ok(())
            }
        }
    })
}
