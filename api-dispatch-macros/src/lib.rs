//! Procedural macros for api-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit action name instead of the variant name
    #[darling(default)]
    name: Option<String>,

    /// The variant's single field is an `ApiCall<Self>`
    #[darling(default)]
    api: bool,
}

/// Derive macro for the Action trait
///
/// Generates:
/// - `Action::name()` returning the variant name, or the `#[action(name = "...")]` override
/// - `ApiCarrier::api_call()` returning the descriptor held by variants marked
///   `#[action(api)]`, and `None` for every other variant
///
/// An `#[action(api)]` variant must be a tuple variant with exactly one field
/// of type `ApiCall<Self>`.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum AppAction {
///     #[action(api, name = "USERS_FETCH")]
///     UsersFetch(ApiCall<AppAction>),
///     UsersDidLoad(serde_json::Value),
///     UsersDidError(ApiError),
/// }
///
/// let action = AppAction::UsersDidLoad(json!([]));
/// assert_eq!(action.name(), "UsersDidLoad");
/// assert!(action.api_call().is_none());
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let mut errors = Vec::new();
    for v in variants.iter().filter(|v| v.api) {
        let single_tuple_field =
            matches!(v.fields.style, darling::ast::Style::Tuple) && v.fields.len() == 1;
        if !single_tuple_field {
            errors.push(
                syn::Error::new_spanned(
                    &v.ident,
                    "#[action(api)] requires a tuple variant with a single ApiCall<Self> field",
                )
                .to_compile_error(),
            );
        }
    }
    if !errors.is_empty() {
        return quote! { #(#errors)* }.into();
    }

    let name_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let action_name = v.name.clone().unwrap_or_else(|| variant_name.to_string());
        quote! { #name::#variant_name { .. } => #action_name }
    });

    let api_call_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        if v.api {
            quote! { #name::#variant_name(call) => ::core::option::Option::Some(call) }
        } else {
            quote! { #name::#variant_name { .. } => ::core::option::Option::None }
        }
    });

    let expanded = quote! {
        impl #impl_generics api_dispatch::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &str {
                match self {
                    #(#name_arms),*
                }
            }
        }

        impl #impl_generics api_dispatch::ApiCarrier for #name #ty_generics #where_clause {
            fn api_call(&self) -> ::core::option::Option<&api_dispatch::ApiCall<Self>> {
                match self {
                    #(#api_call_arms),*
                }
            }
        }
    };

    expanded.into()
}
