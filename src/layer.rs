//! Dielectric layers of a stratified structure.

use crate::args::{ArgValue, KwArgs};
use crate::bridge::{ConstructValue, ForeignValue};
use crate::math::{CScalar, Scalar};
use crate::units::Length;

/// Homogeneous layer. Unset properties take the engine's defaults (free space, zero width).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    /// Thickness.
    pub width: Option<Length>,
    /// Relative permittivity.
    pub epsr: Option<CScalar>,
    /// Relative permeability.
    pub mur: Option<CScalar>,
    /// Electric loss tangent.
    pub tandel: Option<Scalar>,
    /// Magnetic loss tangent.
    pub mtandel: Option<Scalar>,
    /// Electric conductivity in S/m.
    pub sigma: Option<Scalar>,
    /// Magnetic conductivity in Ω/m.
    pub sigmam: Option<Scalar>,
    /// Further keywords for the engine's `Layer` constructor, forwarded verbatim.
    pub extra: KwArgs,
}

impl Layer {
    /// Free-space layer of zero width.
    #[must_use]
    pub const fn free_space() -> Self {
        Self {
            width: None,
            epsr: None,
            mur: None,
            tandel: None,
            mtandel: None,
            sigma: None,
            sigmam: None,
            extra: KwArgs::new(),
        }
    }

    /// Sets the thickness.
    #[must_use]
    pub const fn width(mut self, width: Length) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the relative permittivity; real values are accepted directly.
    #[must_use]
    pub fn epsr(mut self, epsr: impl Into<CScalar>) -> Self {
        self.epsr = Some(epsr.into());
        self
    }

    /// Sets the relative permeability.
    #[must_use]
    pub fn mur(mut self, mur: impl Into<CScalar>) -> Self {
        self.mur = Some(mur.into());
        self
    }

    /// Sets the electric loss tangent.
    #[must_use]
    pub const fn tandel(mut self, tandel: Scalar) -> Self {
        self.tandel = Some(tandel);
        self
    }

    /// Sets the magnetic loss tangent.
    #[must_use]
    pub const fn mtandel(mut self, mtandel: Scalar) -> Self {
        self.mtandel = Some(mtandel);
        self
    }

    /// Sets the electric conductivity.
    #[must_use]
    pub const fn sigma(mut self, sigma: Scalar) -> Self {
        self.sigma = Some(sigma);
        self
    }

    /// Sets the magnetic conductivity.
    #[must_use]
    pub const fn sigmam(mut self, sigmam: Scalar) -> Self {
        self.sigmam = Some(sigmam);
        self
    }

    /// Adds a keyword verbatim; it replaces a typed property of the same name.
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// Deferred `Layer(...)` constructor call carrying only the set properties.
    #[must_use]
    pub fn to_foreign(&self) -> ForeignValue {
        let mut kwargs = KwArgs::new();
        if let Some(width) = self.width {
            kwargs.insert("width", ArgValue::Foreign(width.to_foreign()));
        }
        let constants = [("epsr", self.epsr), ("mur", self.mur)];
        for (name, value) in constants {
            if let Some(value) = value {
                kwargs.insert(name, ArgValue::Foreign(material_constant(value)));
            }
        }
        let losses = [
            ("tandel", self.tandel),
            ("mtandel", self.mtandel),
            ("sigma", self.sigma),
            ("sigmam", self.sigmam),
        ];
        for (name, value) in losses {
            if let Some(value) = value {
                kwargs.insert(name, ArgValue::Foreign(ForeignValue::Float(value)));
            }
        }
        kwargs.extend(self.extra.clone());
        ForeignValue::Construct(ConstructValue {
            function: "Layer".to_owned(),
            kwargs: kwargs.normalized().into_foreign(),
        })
    }
}

fn material_constant(value: CScalar) -> ForeignValue {
    if value.im == 0.0 {
        ForeignValue::Float(value.re)
    } else {
        ForeignValue::Complex(value)
    }
}
