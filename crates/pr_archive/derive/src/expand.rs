use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use syn::{Data, DataEnum, DeriveInput, Fields, Index, Member, Type, WherePredicate, parse_quote};

use crate::attributes::{Candidate, FieldAttributes, TypeAttributes};
use crate::path;

// -----------------------------------------------------------------------------
// Body

/// The strategy-specific part of an impl.
struct Body {
    min_encoded_len: TokenStream,
    methods: TokenStream,
    predicates: Vec<WherePredicate>,
    /// Items emitted next to the `Persist` impl.
    extra: TokenStream,
}

/// Context shared by the body generators.
struct Ctx<'a> {
    ast: &'a DeriveInput,
    krate: syn::Path,
    /// Bounds on field types are only needed when type parameters exist.
    generic: bool,
}

impl Ctx<'_> {
    fn self_ty(&self) -> Type {
        let ident = &self.ast.ident;
        let (_, ty_generics, _) = self.ast.generics.split_for_impl();
        parse_quote!(#ident #ty_generics)
    }

    fn signatures(&self) -> (TokenStream, TokenStream) {
        let output_archive_ = path::output_archive_(&self.krate);
        let input_archive_ = path::input_archive_(&self.krate);
        let byte_sink_ = path::byte_sink_(&self.krate);
        let byte_source_ = path::byte_source_(&self.krate);
        let archive_error_ = path::archive_error_(&self.krate);

        (
            quote! {
                fn save<__W: #byte_sink_>(
                    &self,
                    ar: &mut #output_archive_<'_, __W>,
                ) -> ::core::result::Result<(), #archive_error_>
            },
            quote! {
                fn load<__R: #byte_source_>(
                    &mut self,
                    ar: &mut #input_archive_<'_, __R>,
                ) -> ::core::result::Result<(), #archive_error_>
            },
        )
    }

    fn bound(&self, ty: &Type, bound: &TokenStream) -> Option<WherePredicate> {
        self.generic.then(|| parse_quote!(#ty: #bound))
    }
}

// -----------------------------------------------------------------------------
// Entry

pub(crate) fn derive_persist(ast: &DeriveInput) -> syn::Result<TokenStream> {
    if let Data::Union(data) = &ast.data {
        return Err(syn::Error::new_spanned(
            data.union_token,
            "`Persist` cannot be derived for unions",
        ));
    }

    let attrs = TypeAttributes::parse(&ast.attrs)?;
    let candidates = attrs.candidates();

    let ctx = Ctx {
        ast,
        krate: path::pr_archive(),
        generic: ast.generics.type_params().next().is_some(),
    };

    let body = match candidates[0] {
        Candidate::MemberDefined => match (&attrs.save, &attrs.load) {
            (Some(save), Some(load)) => own_functions_body(&ctx, save, load),
            _ => match &ast.data {
                Data::Struct(data) => struct_body(&ctx, &data.fields)?,
                Data::Enum(data) => enum_body(&ctx, data)?,
                Data::Union(_) => unreachable!("rejected above"),
            },
        },
        Candidate::ExternallyRegistered => external_body(&ctx),
        Candidate::TrivialCopy => trivial_body(&ctx),
    };

    let krate = &ctx.krate;
    let persist_ = path::persist_(krate);
    let strategy_ = path::strategy_(krate);
    let strategy_set_ = path::strategy_set_(krate);
    let flags = candidates.iter().map(|candidate| candidate.flag());

    let ident = &ast.ident;
    let mut generics = ast.generics.clone();
    generics.make_where_clause().predicates.extend(body.predicates);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let Body {
        min_encoded_len,
        methods,
        extra,
        ..
    } = body;

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #persist_ for #ident #ty_generics #where_clause {
            const STRATEGY: #strategy_ = match #strategy_::resolve(
                #strategy_set_::empty() #(.union(#strategy_set_::#flags))*
            ) {
                ::core::option::Option::Some(strategy) => strategy,
                ::core::option::Option::None => ::core::panic!("no encoding strategy"),
            };
            const MIN_ENCODED_LEN: usize = #min_encoded_len;

            #methods
        }

        #extra
    })
}

// -----------------------------------------------------------------------------
// Member-Defined

fn own_functions_body(ctx: &Ctx, save: &syn::Path, load: &syn::Path) -> Body {
    let (save_sig, load_sig) = ctx.signatures();
    Body {
        min_encoded_len: quote!(0),
        methods: quote! {
            #[inline]
            #save_sig {
                #save(self, ar)
            }

            #[inline]
            #load_sig {
                #load(self, ar)
            }
        },
        predicates: Vec::new(),
        extra: TokenStream::new(),
    }
}

fn member(index: usize, field: &syn::Field) -> Member {
    match &field.ident {
        Some(ident) => Member::Named(ident.clone()),
        None => Member::Unnamed(Index::from(index)),
    }
}

fn struct_body(ctx: &Ctx, fields: &Fields) -> syn::Result<Body> {
    let persist_ = path::persist_(&ctx.krate);
    let default_ = quote!(::core::default::Default);

    let mut saves = Vec::new();
    let mut loads = Vec::new();
    let mut lens = Vec::new();
    let mut predicates = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let attrs = FieldAttributes::parse(&field.attrs)?;
        let member = member(index, field);
        let ty = &field.ty;

        if attrs.skip {
            loads.push(quote! { self.#member = #default_::default(); });
            predicates.extend(ctx.bound(ty, &default_));
        } else {
            saves.push(quote! { #persist_::save(&self.#member, ar)?; });
            loads.push(quote! { #persist_::load(&mut self.#member, ar)?; });
            lens.push(quote! { + <#ty as #persist_>::MIN_ENCODED_LEN });
            predicates.extend(ctx.bound(ty, &persist_));
        }
    }

    let unused_save = saves.is_empty().then(|| quote! { let _ = ar; });
    let unused_load = lens.is_empty().then(|| quote! { let _ = ar; });

    let (save_sig, load_sig) = ctx.signatures();
    Ok(Body {
        min_encoded_len: quote!(0 #(#lens)*),
        methods: quote! {
            #save_sig {
                #unused_save
                #(#saves)*
                ::core::result::Result::Ok(())
            }

            #load_sig {
                #unused_load
                #(#loads)*
                ::core::result::Result::Ok(())
            }
        },
        predicates,
        extra: TokenStream::new(),
    })
}

/// `[variant index: u32][fields...]`; variants are rebuilt from `Default` fields.
fn enum_body(ctx: &Ctx, data: &DataEnum) -> syn::Result<Body> {
    let persist_ = path::persist_(&ctx.krate);
    let archive_error_ = path::archive_error_(&ctx.krate);
    let default_ = quote!(::core::default::Default);
    let field_bound = quote!(#persist_ + #default_);

    let mut save_arms = Vec::new();
    let mut load_arms = Vec::new();
    let mut predicates = Vec::new();

    for (variant_index, variant) in data.variants.iter().enumerate() {
        let ident = &variant.ident;
        let Ok(index) = u32::try_from(variant_index) else {
            return Err(syn::Error::new_spanned(ident, "too many variants"));
        };
        let tag = Literal::u32_suffixed(index);
        let pattern_index = Literal::u32_unsuffixed(index);

        let mut bindings = Vec::new();
        let mut saves = Vec::new();
        let mut loads = Vec::new();
        let mut inits = Vec::new();

        for (field_index, field) in variant.fields.iter().enumerate() {
            let attrs = FieldAttributes::parse(&field.attrs)?;
            let member = member(field_index, field);
            let ty = &field.ty;

            if attrs.skip {
                bindings.push(quote! { #member: _ });
                inits.push(quote! { #member: #default_::default() });
                predicates.extend(ctx.bound(ty, &default_));
            } else {
                let var = format_ident!("__field_{}", field_index);
                bindings.push(quote! { #member: #var });
                saves.push(quote! { #persist_::save(#var, ar)?; });
                loads.push(quote! {
                    let mut #var: #ty = #default_::default();
                    #persist_::load(&mut #var, ar)?;
                });
                inits.push(quote! { #member: #var });
                predicates.extend(ctx.bound(ty, &field_bound));
            }
        }

        save_arms.push(quote! {
            Self::#ident { #(#bindings),* } => {
                #persist_::save(&#tag, ar)?;
                #(#saves)*
            }
        });
        load_arms.push(quote! {
            #pattern_index => {
                #(#loads)*
                *self = Self::#ident { #(#inits),* };
                ::core::result::Result::Ok(())
            }
        });
    }

    let save_body = if save_arms.is_empty() {
        quote! {
            let _ = ar;
            match *self {}
        }
    } else {
        quote! {
            match self { #(#save_arms)* }
            ::core::result::Result::Ok(())
        }
    };

    let (save_sig, load_sig) = ctx.signatures();
    Ok(Body {
        min_encoded_len: quote!(::core::mem::size_of::<u32>()),
        methods: quote! {
            #save_sig {
                #save_body
            }

            #load_sig {
                let mut index: u32 = 0;
                #persist_::load(&mut index, ar)?;
                match index {
                    #(#load_arms)*
                    _ => ::core::result::Result::Err(#archive_error_::InvalidVariant {
                        type_name: ::core::any::type_name::<Self>(),
                        index,
                    }),
                }
            }
        },
        predicates,
        extra: TokenStream::new(),
    })
}

// -----------------------------------------------------------------------------
// Externally-Registered

fn external_body(ctx: &Ctx) -> Body {
    let krate = &ctx.krate;
    let persist_mod_ = path::persist_mod_(krate);
    let macro_exports_ = path::macro_exports_(krate);
    let archive_error_ = path::archive_error_(krate);
    let input_archive_ = path::input_archive_(krate);
    let output_archive_ = path::output_archive_(krate);
    let byte_sink_ = path::byte_sink_(krate);
    let byte_source_ = path::byte_source_(krate);
    let self_ty = ctx.self_ty();
    let (save_sig, load_sig) = ctx.signatures();
    Body {
        min_encoded_len: quote!(0),
        methods: quote! {
            #[inline]
            #save_sig {
                ar.save_registered(self)
            }

            #[inline]
            #load_sig {
                ar.load_registered(self)
            }

            #[inline]
            fn save_slice<__W: #byte_sink_>(
                items: &[Self],
                ar: &mut #output_archive_<'_, __W>,
            ) -> ::core::result::Result<(), #archive_error_> {
                ar.save_registered_all(items)
            }

            #[inline]
            fn load_slice<__R: #byte_source_>(
                items: &mut [Self],
                ar: &mut #input_archive_<'_, __R>,
            ) -> ::core::result::Result<(), #archive_error_> {
                ar.load_registered_all(items)
            }

            #[inline]
            fn load_into_vec<__R: #byte_source_>(
                len: usize,
                out: &mut #macro_exports_::Vec<Self>,
                ar: &mut #input_archive_<'_, __R>,
                fresh: impl FnMut() -> Self,
            ) -> ::core::result::Result<(), #archive_error_> {
                #persist_mod_::load_vec_in_chunks(len, out, ar, fresh, Self::load_slice)
            }
        },
        predicates: vec![parse_quote!(#self_ty: 'static)],
        extra: TokenStream::new(),
    }
}

// -----------------------------------------------------------------------------
// Trivial-Copy

fn trivial_body(ctx: &Ctx) -> Body {
    let krate = &ctx.krate;
    let persist_mod_ = path::persist_mod_(krate);
    let macro_exports_ = path::macro_exports_(krate);
    let archive_error_ = path::archive_error_(krate);
    let input_archive_ = path::input_archive_(krate);
    let output_archive_ = path::output_archive_(krate);
    let byte_sink_ = path::byte_sink_(krate);
    let byte_source_ = path::byte_source_(krate);
    let self_ty = ctx.self_ty();
    let pod: WherePredicate = parse_quote!(#self_ty: #macro_exports_::bytemuck::Pod);

    let ast = ctx.ast;
    let ident = &ast.ident;
    let mut generics = ast.generics.clone();
    generics.make_where_clause().predicates.push(pod.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let (save_sig, load_sig) = ctx.signatures();
    Body {
        min_encoded_len: quote!(::core::mem::size_of::<Self>()),
        methods: quote! {
            #[inline]
            #save_sig {
                #persist_mod_::save_pod(self, ar)
            }

            #[inline]
            #load_sig {
                #persist_mod_::load_pod(self, ar)
            }

            #[inline]
            fn save_slice<__W: #byte_sink_>(
                items: &[Self],
                ar: &mut #output_archive_<'_, __W>,
            ) -> ::core::result::Result<(), #archive_error_> {
                #persist_mod_::save_pod_slice(items, ar)
            }

            #[inline]
            fn load_slice<__R: #byte_source_>(
                items: &mut [Self],
                ar: &mut #input_archive_<'_, __R>,
            ) -> ::core::result::Result<(), #archive_error_> {
                #persist_mod_::load_pod_slice(items, ar)
            }

            #[inline]
            fn load_into_vec<__R: #byte_source_>(
                len: usize,
                out: &mut #macro_exports_::Vec<Self>,
                ar: &mut #input_archive_<'_, __R>,
                _fresh: impl FnMut() -> Self,
            ) -> ::core::result::Result<(), #archive_error_> {
                #persist_mod_::load_pod_vec(len, out, ar)
            }
        },
        predicates: vec![pod],
        extra: quote! {
            #[automatically_derived]
            impl #impl_generics #persist_mod_::Trivial for #ident #ty_generics #where_clause {}
        },
    }
}
