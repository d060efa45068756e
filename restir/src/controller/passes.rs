use log::debug;

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct DiPasses {
            $( pub $name: $class, )*
        }

        impl DiPasses {
            pub fn new() -> Self {
                debug!("Initializing DI passes");

                Self {
                    $( $name: $class::new(), )*
                }
            }
        }
    };
}

passes!([
    initial_candidates => InitialCandidatesPass,
    spatial_resampling => SpatialResamplingPass,
    temporal_resampling => TemporalResamplingPass,
]);
