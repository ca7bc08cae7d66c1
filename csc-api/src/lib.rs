pub mod assignment;
pub mod client;
pub mod creds;
pub mod error;
pub mod services;
pub mod submission;
pub mod types;

mod util;

/// Declares `lazy_static` [`scraper::Selector`]s. Each selector is a fixed structural path into a
/// platform page, so a markup change on the platform only touches the module declaring it.
#[macro_export]
macro_rules! selectors {
    ($name:ident = $x:expr $(,)?) => {
        ::lazy_static::lazy_static! { static ref $name: ::scraper::Selector = ::scraper::Selector::parse($x).unwrap(); }
    };

    ($name:ident = $x:expr, $($names:ident = $xs:expr),+ $(,)?) => {
        $crate::selectors! { $name = $x }
        $crate::selectors! {
            $($names = $xs),+
        }
    };
}
