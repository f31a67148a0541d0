pub mod general_helpers;
