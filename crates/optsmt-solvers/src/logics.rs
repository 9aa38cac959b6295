// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Capability tags for the fragments a backend accepts

use std::fmt;

/// A solver logic, named as in SMT-LIB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Logic {
    pub name: &'static str,
    pub quantifier_free: bool,
    pub integer_arithmetic: bool,
    pub real_arithmetic: bool,
    pub linear: bool,
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub const QF_LIA: Logic = Logic {
    name: "QF_LIA",
    quantifier_free: true,
    integer_arithmetic: true,
    real_arithmetic: false,
    linear: true,
};

pub const QF_LRA: Logic = Logic {
    name: "QF_LRA",
    quantifier_free: true,
    integer_arithmetic: false,
    real_arithmetic: true,
    linear: true,
};

pub const QF_LIRA: Logic = Logic {
    name: "QF_LIRA",
    quantifier_free: true,
    integer_arithmetic: true,
    real_arithmetic: true,
    linear: true,
};

pub const QF_NIA: Logic = Logic {
    name: "QF_NIA",
    quantifier_free: true,
    integer_arithmetic: true,
    real_arithmetic: false,
    linear: false,
};

pub const QF_NRA: Logic = Logic {
    name: "QF_NRA",
    quantifier_free: true,
    integer_arithmetic: false,
    real_arithmetic: true,
    linear: false,
};

pub const LIA: Logic = Logic {
    name: "LIA",
    quantifier_free: false,
    integer_arithmetic: true,
    real_arithmetic: false,
    linear: true,
};

pub const LRA: Logic = Logic {
    name: "LRA",
    quantifier_free: false,
    integer_arithmetic: false,
    real_arithmetic: true,
    linear: true,
};
