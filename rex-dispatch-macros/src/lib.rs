//! Procedural macros for rex-dispatch

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

    /// Also implement `ActionSummary` with its Debug-based default
    #[darling(default)]
    summary: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// The variant wraps a child action enum; delegate `name()` to it
    #[darling(default)]
    lift: bool,

    /// Explicit category override
    #[darling(default)]
    category: Option<String>,

    /// Never assign a category
    #[darling(default)]
    skip_category: bool,
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

impl ActionVariant {
    fn category(&self) -> Option<String> {
        if self.skip_category {
            None
        } else if let Some(explicit) = &self.category {
            Some(explicit.clone())
        } else if self.lift {
            Some(to_snake_case(&self.ident.to_string()))
        } else {
            None
        }
    }

    fn check(&self) -> darling::Result<()> {
        let single_tuple =
            self.fields.style == darling::ast::Style::Tuple && self.fields.fields.len() == 1;
        if self.lift && !single_tuple {
            return Err(darling::Error::custom(
                "#[action(lift)] requires a tuple variant with exactly one field",
            )
            .with_span(&self.ident));
        }
        if self.skip_category && self.category.is_some() {
            return Err(darling::Error::custom(
                "`category` and `skip_category` are mutually exclusive",
            )
            .with_span(&self.ident));
        }
        Ok(())
    }
}

/// Derive macro for the Action trait
///
/// Generates `Action::name()`, returning the variant name as a static string,
/// and `ActionCategory::category()`.
///
/// Variants marked `#[action(lift)]` wrap a child action enum: their name is
/// the child's name and their category defaults to the snake_case variant
/// name. `#[action(category = "...")]` sets a category explicitly,
/// `#[action(skip_category)]` leaves a lifted variant uncategorized.
///
/// With `#[action(summary)]` on the enum, `ActionSummary` is implemented with
/// its Debug-based default.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(summary)]
/// enum AppAction {
///     Trigger,
///     #[action(lift)]
///     Capture(CaptureAction),
///     #[action(lift, category = "ocr")]
///     Detection(DetectionAction),
/// }
///
/// let action = AppAction::Capture(CaptureAction::StartCapture);
/// assert_eq!(action.name(), "StartCapture");
/// assert_eq!(action.category(), Some("capture"));
/// assert_eq!(AppAction::Trigger.category(), None);
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

    let errors: Vec<darling::Error> = variants.iter().filter_map(|v| v.check().err()).collect();
    if !errors.is_empty() {
        return darling::Error::multiple(errors).write_errors().into();
    }

    let name_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let variant_str = variant_name.to_string();

        if v.lift {
            return quote! {
                #name::#variant_name(inner) => ::rex_dispatch::Action::name(inner)
            };
        }
        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #variant_str
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #variant_str
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #variant_str
            },
        }
    });

    let category_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let category = match v.category() {
            Some(c) => quote! { ::core::option::Option::Some(#c) },
            None => quote! { ::core::option::Option::None },
        };
        // brace pattern matches unit, tuple and struct variants alike
        quote! { #name::#variant_name { .. } => #category }
    });

    let summary: proc_macro2::TokenStream = if opts.summary {
        quote! {
            impl #impl_generics ::rex_dispatch::ActionSummary for #name #ty_generics #where_clause {}
        }
    } else {
        quote! {}
    };

    // an uninhabited enum has no arms to match
    let (name_body, category_body) = if variants.is_empty() {
        (quote! { match *self {} }, quote! { match *self {} })
    } else {
        (
            quote! { match self { #(#name_arms),* } },
            quote! { match self { #(#category_arms),* } },
        )
    };

    let expanded = quote! {
        impl #impl_generics ::rex_dispatch::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                #name_body
            }
        }

        impl #impl_generics ::rex_dispatch::ActionCategory for #name #ty_generics #where_clause {
            fn category(&self) -> ::core::option::Option<&'static str> {
                #category_body
            }
        }

        #summary
    };

    TokenStream::from(expanded)
}
