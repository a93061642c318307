// SPDX-License-Identifier: MIT
pub mod cte;
pub mod oxides;
pub mod umf;
