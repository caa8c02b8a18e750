//! Sheet constructors, one typed option struct per sheet style.
//!
//! Every option struct maps its fields onto the engine's keyword names, carries the
//! keywords shared by all styles and an `extra` mapping that is forwarded verbatim.
//! Invalid names or values are only detected by the engine.

use std::sync::Arc;

use tracing::instrument;

use crate::args::KwArgs;
use crate::bridge::Request;
use crate::errors::Result;
use crate::math::Scalar;
use crate::session::Session;
use crate::sheet::{SheetClass, SheetHandle};
use crate::units::UnitTag;

/// A sheet style with typed options.
pub trait SheetStyle {
    /// Name of the foreign constructor.
    const STYLE: &'static str;

    /// Keyword arguments for the constructor, before normalization.
    fn to_kwargs(&self) -> KwArgs;
}

macro_rules! sheet_options {
    (
        $(#[$meta:meta])*
        $name:ident => $style:literal {
            $($(#[$fmeta:meta])* $field:ident: $ty:ty => $key:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: Option<$ty>,)*
            /// Length unit of every dimension.
            pub units: Option<UnitTag>,
            /// Electric or magnetic sheet.
            pub class: Option<SheetClass>,
            /// Scale factor applied to all dimensions.
            pub sheetscale: Option<Scalar>,
            /// Unique-face-pair detection during matrix fill.
            pub fufp: Option<bool>,
            /// Further keyword arguments, forwarded verbatim.
            pub extra: KwArgs,
        }

        impl $name {
            $(
                #[doc = concat!("Sets `", $key, "`.")]
                #[must_use]
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*

            /// Sets the length unit.
            #[must_use]
            pub const fn units(mut self, units: UnitTag) -> Self {
                self.units = Some(units);
                self
            }

            /// Sets the sheet class.
            #[must_use]
            pub const fn class(mut self, class: SheetClass) -> Self {
                self.class = Some(class);
                self
            }

            /// Sets the scale factor.
            #[must_use]
            pub const fn sheetscale(mut self, scale: Scalar) -> Self {
                self.sheetscale = Some(scale);
                self
            }

            /// Enables or disables unique-face-pair detection.
            #[must_use]
            pub const fn fufp(mut self, fufp: bool) -> Self {
                self.fufp = Some(fufp);
                self
            }

            /// Adds a keyword argument that has no typed field.
            #[must_use]
            pub fn arg(mut self, key: impl Into<String>, value: impl Into<crate::args::ArgValue>) -> Self {
                self.extra.insert(key, value);
                self
            }
        }

        impl SheetStyle for $name {
            const STYLE: &'static str = $style;

            fn to_kwargs(&self) -> KwArgs {
                let mut kwargs = KwArgs::new();
                $(
                    if let Some(value) = &self.$field {
                        kwargs.insert($key, value.clone());
                    }
                )*
                if let Some(units) = self.units {
                    kwargs.insert(crate::args::UNITS_KEY, units);
                }
                if let Some(class) = self.class {
                    kwargs.insert(crate::args::CLASS_KEY, class);
                }
                if let Some(scale) = self.sheetscale {
                    kwargs.insert("sheetscale", scale);
                }
                if let Some(fufp) = self.fufp {
                    kwargs.insert("fufp", fufp);
                }
                kwargs.extend(self.extra.clone());
                kwargs
            }
        }
    };
}

sheet_options! {
    /// Strips running diagonally across a square unit cell.
    DiagStrip => "diagstrip" {
        /// Period of the square cell.
        p: Scalar => "P",
        /// Strip width.
        w: Scalar => "w",
        /// Triangles along the strip length.
        nl: i64 => "Nl",
        /// Triangles across the strip width.
        nw: i64 => "Nw",
        /// Rotation angle in degrees.
        orient: Scalar => "orient",
    }
}

sheet_options! {
    /// Rectangular strip in a rectangular unit cell.
    RectStrip => "rectstrip" {
        /// Triangle subdivisions along x.
        nx: i64 => "Nx",
        /// Triangle subdivisions along y.
        ny: i64 => "Ny",
        /// Cell period along x.
        px: Scalar => "Px",
        /// Cell period along y.
        py: Scalar => "Py",
        /// Strip length along x.
        lx: Scalar => "Lx",
        /// Strip length along y.
        ly: Scalar => "Ly",
        /// Strip offset along x.
        dx: Scalar => "dx",
        /// Strip offset along y.
        dy: Scalar => "dy",
        /// Rotation angle in degrees.
        rot: Scalar => "rot",
    }
}

sheet_options! {
    /// Concentric polygonal rings.
    PolyRing => "polyring" {
        /// First lattice vector.
        s1: Vec<Scalar> => "s1",
        /// Second lattice vector.
        s2: Vec<Scalar> => "s2",
        /// Inner radii; a negative first entry fills the centre.
        a: Vec<Scalar> => "a",
        /// Outer radii.
        b: Vec<Scalar> => "b",
        /// Number of polygon sides.
        sides: i64 => "sides",
        /// Rotation angle in degrees.
        orient: Scalar => "orient",
        /// Target triangle count.
        ntri: i64 => "ntri",
    }
}

sheet_options! {
    /// Pixelated unit cell.
    Pixels => "pixels" {
        /// First lattice vector.
        s1: Vec<Scalar> => "s1",
        /// Second lattice vector.
        s2: Vec<Scalar> => "s2",
        /// Target triangle count.
        ntri: i64 => "ntri",
    }
}

sheet_options! {
    /// Pixelated unit cell with imposed symmetry.
    SymPixels => "sympixels" {
        /// First lattice vector.
        s1: Vec<Scalar> => "s1",
        /// Second lattice vector.
        s2: Vec<Scalar> => "s2",
        /// Target triangle count.
        ntri: i64 => "ntri",
    }
}

sheet_options! {
    /// Polygonal ring with a gap.
    SplitRing => "splitring" {
        /// First lattice vector.
        s1: Vec<Scalar> => "s1",
        /// Second lattice vector.
        s2: Vec<Scalar> => "s2",
        /// Inner radii.
        a: Vec<Scalar> => "a",
        /// Outer radii.
        b: Vec<Scalar> => "b",
        /// Number of polygon sides.
        sides: i64 => "sides",
        /// Width of the gap.
        gapwidth: Scalar => "gapwidth",
        /// Angular position of the gap centre in degrees.
        gapcenter: Scalar => "gapcenter",
        /// Rotation angle in degrees.
        orient: Scalar => "orient",
        /// Target triangle count.
        ntri: i64 => "ntri",
    }
}

sheet_options! {
    /// Cross with loaded arms.
    LoadedCross => "loadedcross" {
        /// First lattice vector.
        s1: Vec<Scalar> => "s1",
        /// Second lattice vector.
        s2: Vec<Scalar> => "s2",
        /// Outer arm length.
        l1: Scalar => "L1",
        /// Outer arm width.
        l2: Scalar => "L2",
        /// Strip width.
        w: Scalar => "w",
        /// Rotation angle in degrees.
        orient: Scalar => "orient",
        /// Target triangle count.
        ntri: i64 => "ntri",
    }
}

sheet_options! {
    /// Jerusalem cross in a square unit cell.
    JerusalemCross => "jerusalemcross" {
        /// Period of the square cell.
        p: Scalar => "P",
        /// Arm length.
        l1: Scalar => "L1",
        /// Cap length.
        l2: Scalar => "L2",
        /// Arm width.
        a: Scalar => "A",
        /// Cap width.
        b: Scalar => "B",
        /// Strip width.
        w: Scalar => "w",
        /// Target triangle count.
        ntri: i64 => "ntri",
    }
}

sheet_options! {
    /// Manji (swastika-like) element.
    Manji => "manji" {
        /// First lattice vector.
        s1: Vec<Scalar> => "s1",
        /// Second lattice vector.
        s2: Vec<Scalar> => "s2",
        /// Arm length.
        l1: Scalar => "L1",
        /// Bend length.
        l2: Scalar => "L2",
        /// Tip length.
        l3: Scalar => "L3",
        /// Strip width.
        w: Scalar => "w",
        /// Rotation angle in degrees.
        orient: Scalar => "orient",
        /// Target triangle count.
        ntri: i64 => "ntri",
    }
}

sheet_options! {
    /// Meander line.
    Meander => "meander" {
        /// Cell period along x.
        a: Scalar => "a",
        /// Cell period along y.
        b: Scalar => "b",
        /// Meander height.
        h: Scalar => "h",
        /// Width of the horizontal runs.
        w1: Scalar => "w1",
        /// Width of the vertical runs.
        w2: Scalar => "w2",
        /// Rotation angle in degrees.
        orient: Scalar => "orient",
        /// Target triangle count.
        ntri: i64 => "ntri",
    }
}

sheet_options! {
    /// Sinuous element.
    Sinuous => "sinuous" {
        /// First lattice vector.
        s1: Vec<Scalar> => "s1",
        /// Second lattice vector.
        s2: Vec<Scalar> => "s2",
        /// Target triangle count.
        ntri: i64 => "ntri",
    }
}

/// Calls the constructor named `style` with `kwargs` (normalized first).
#[instrument(skip(session, kwargs), fields(args = kwargs.len()))]
pub fn build_sheet(session: &Arc<Session>, style: &str, kwargs: KwArgs) -> Result<SheetHandle> {
    let kwargs = kwargs.normalized();
    let foreign = session.retain(&Request::Call {
        function: style.to_owned(),
        args: Vec::new(),
        kwargs: kwargs.into_foreign(),
        retain: true,
    })?;
    SheetHandle::from_foreign(foreign)
}

/// Builds a sheet from typed options.
pub fn build<S: SheetStyle>(session: &Arc<Session>, options: &S) -> Result<SheetHandle> {
    build_sheet(session, S::STYLE, options.to_kwargs())
}

/// Diagonal strip.
pub fn diagstrip(session: &Arc<Session>, options: &DiagStrip) -> Result<SheetHandle> {
    build(session, options)
}

/// Rectangular strip.
pub fn rectstrip(session: &Arc<Session>, options: &RectStrip) -> Result<SheetHandle> {
    build(session, options)
}

/// Polygonal rings.
pub fn polyring(session: &Arc<Session>, options: &PolyRing) -> Result<SheetHandle> {
    build(session, options)
}

/// Pixelated cell.
pub fn pixels(session: &Arc<Session>, options: &Pixels) -> Result<SheetHandle> {
    build(session, options)
}

/// Symmetric pixelated cell.
pub fn sympixels(session: &Arc<Session>, options: &SymPixels) -> Result<SheetHandle> {
    build(session, options)
}

/// Split ring.
pub fn splitring(session: &Arc<Session>, options: &SplitRing) -> Result<SheetHandle> {
    build(session, options)
}

/// Loaded cross.
pub fn loadedcross(session: &Arc<Session>, options: &LoadedCross) -> Result<SheetHandle> {
    build(session, options)
}

/// Jerusalem cross.
pub fn jerusalemcross(session: &Arc<Session>, options: &JerusalemCross) -> Result<SheetHandle> {
    build(session, options)
}

/// Manji.
pub fn manji(session: &Arc<Session>, options: &Manji) -> Result<SheetHandle> {
    build(session, options)
}

/// Meander line.
pub fn meander(session: &Arc<Session>, options: &Meander) -> Result<SheetHandle> {
    build(session, options)
}

/// Sinuous element.
pub fn sinuous(session: &Arc<Session>, options: &Sinuous) -> Result<SheetHandle> {
    build(session, options)
}

/// Perfect electric conducting sheet (an "E-wall").
pub fn pecsheet(session: &Arc<Session>) -> Result<SheetHandle> {
    build_sheet(session, "pecsheet", KwArgs::new())
}

/// Perfect magnetic conducting sheet (an "H-wall").
pub fn pmcsheet(session: &Arc<Session>) -> Result<SheetHandle> {
    build_sheet(session, "pmcsheet", KwArgs::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::fake::{FakeEngine, FakeObject};
    use crate::bridge::ForeignValue;
    use crate::errors::PssfssError;
    use crate::units::{INCH, MM};

    fn last_kwargs(state: &crate::bridge::fake::FakeState) -> Vec<(String, ForeignValue)> {
        state
            .objects
            .values()
            .find_map(|o| match o {
                FakeObject::Sheet { kwargs, .. } => Some(kwargs.clone()),
                _ => None,
            })
            .expect("a sheet was built")
    }

    #[test]
    fn typed_options_map_onto_foreign_keywords() {
        let options = PolyRing::default()
            .s1([1.0, 0.0])
            .s2([0.0, 1.0])
            .a([-1.0])
            .b([0.4])
            .sides(6)
            .ntri(600)
            .units(INCH)
            .class(SheetClass::Magnetic);
        assert_eq!(
            options.to_kwargs().normalized().into_foreign(),
            vec![
                ("s1".to_owned(), ForeignValue::Array(vec![1.0, 0.0])),
                ("s2".to_owned(), ForeignValue::Array(vec![0.0, 1.0])),
                ("a".to_owned(), ForeignValue::Array(vec![-1.0])),
                ("b".to_owned(), ForeignValue::Array(vec![0.4])),
                ("sides".to_owned(), ForeignValue::Int(6)),
                ("ntri".to_owned(), ForeignValue::Int(600)),
                ("units".to_owned(), ForeignValue::Unit("inch".into())),
                ("class".to_owned(), ForeignValue::Char('M')),
            ]
        );
    }

    #[test]
    fn extra_arguments_are_forwarded_verbatim() {
        let kwargs = RectStrip::default()
            .nx(10)
            .arg("structuredtri", false)
            .to_kwargs();
        assert_eq!(kwargs.get("structuredtri"), Some(&crate::args::ArgValue::Bool(false)));
        assert_eq!(kwargs.get("Nx"), Some(&crate::args::ArgValue::Int(10)));
    }

    #[test]
    fn constructor_sends_normalized_arguments() {
        let (engine, state) = FakeEngine::new();
        let session = Session::with_engine(engine);
        let sheet = jerusalemcross(
            &session,
            &JerusalemCross::default().p(10.0).l1(8.0).w(0.5).units(MM),
        )
        .expect("sheet");
        assert_eq!(sheet.style(), "jerusalemcross");
        assert_eq!(sheet.units(), MM);
        let kwargs = last_kwargs(&state.lock());
        assert!(kwargs.contains(&("units".to_owned(), ForeignValue::Unit("mm".into()))));
        assert!(kwargs.contains(&("P".to_owned(), ForeignValue::Float(10.0))));
    }

    #[test]
    fn raw_keyword_path_renames_clas() {
        let (engine, state) = FakeEngine::new();
        let session = Session::with_engine(engine);
        let kwargs = KwArgs::new()
            .with("units", INCH)
            .with("clas", 'M')
            .with("s1", vec![1.0, 0.0]);
        let sheet = build_sheet(&session, "splitring", kwargs).expect("sheet");
        assert_eq!(sheet.geometry().sheet_class(), Some(SheetClass::Magnetic));
        assert_eq!(sheet.units(), INCH);
        let sent = last_kwargs(&state.lock());
        assert!(sent.iter().all(|(k, _)| k != "clas"));
    }

    #[test]
    fn pec_and_pmc_sheets_take_no_arguments() {
        let (engine, state) = FakeEngine::new();
        let session = Session::with_engine(engine);
        let pec = pecsheet(&session).expect("pec");
        let pmc = pmcsheet(&session).expect("pmc");
        assert_eq!(pec.style(), "pecsheet");
        assert_eq!(pmc.style(), "pmcsheet");
        assert_eq!(pec.geometry().node_count(), 0);
        assert!(pmc.geometry().fv.is_empty());
        for call in state.lock().calls_to("pecsheet") {
            assert!(matches!(call, Request::Call { kwargs, args, .. } if kwargs.is_empty() && args.is_empty()));
        }
    }

    #[test]
    fn engine_rejection_surfaces_as_foreign_call_error() {
        let (engine, state) = FakeEngine::new();
        state.lock().failing.push("meander".into());
        let session = Session::with_engine(engine);
        let err = meander(&session, &Meander::default().a(1.0)).expect_err("rejected");
        assert!(matches!(err, PssfssError::ForeignCall { .. }));
        assert!(state.lock().objects.is_empty());
    }
}
