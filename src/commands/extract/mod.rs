mod cex;
mod csv;
mod html;
mod json;
mod run;
mod sql;
mod summary;
mod xml;

pub use run::run;

use cex::*;
use csv::*;
use html::*;
use json::*;
use sql::*;
use summary::*;
use xml::*;
