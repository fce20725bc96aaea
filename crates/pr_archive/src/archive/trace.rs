//! Chain of types being encoded or decoded, kept in debug builds only.

crate::cfg::debug! {
    if {
        use alloc::vec::Vec;
        use core::fmt;

        /// Stack of type names entered through archive-level calls.
        ///
        /// When a call fails, the stack at the innermost failing frame is
        /// kept and logged once the outermost call returns.
        #[derive(Default)]
        pub(crate) struct TypeTrace {
            stack: Vec<&'static str>,
            failure: Option<Vec<&'static str>>,
        }

        impl TypeTrace {
            pub(crate) fn enter(&mut self, type_name: &'static str) {
                if self.stack.is_empty() {
                    self.failure = None;
                }
                self.stack.push(type_name);
            }

            pub(crate) fn leave<T, E: fmt::Display>(&mut self, result: &Result<T, E>) {
                if let Err(e) = result {
                    let failure = self.failure.get_or_insert_with(|| self.stack.clone());
                    if self.stack.len() == 1 {
                        log::debug!("archive error: {e} (stack:\n{})", Path(failure));
                    }
                }
                self.stack.pop();
            }

            /// The type chain of the last failed call, outermost first.
            #[cfg(test)]
            pub(crate) fn failure(&self) -> Option<&[&'static str]> {
                self.failure.as_deref()
            }
        }

        struct Path<'a>(&'a [&'static str]);

        impl fmt::Display for Path<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut iter = self.0.iter();
                if let Some(first) = iter.next() {
                    writeln!(f, "`{first}`")?;
                }
                for name in iter {
                    writeln!(f, " -> `{name}`")?;
                }
                Ok(())
            }
        }
    } else {
        #[derive(Default)]
        pub(crate) struct TypeTrace;

        impl TypeTrace {
            #[inline(always)]
            pub(crate) fn enter(&mut self, _: &'static str) {}

            #[inline(always)]
            pub(crate) fn leave<T, E>(&mut self, _: &Result<T, E>) {}
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
