pub mod deadline;
pub mod explicit;
pub mod smv_printer;
