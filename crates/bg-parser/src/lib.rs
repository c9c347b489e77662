mod docstring;
mod field_list;
mod python;
mod xml;

pub use docstring::{clean_docstring, unquote_string_literal};
pub use field_list::{docstring_prose, extract_fields, Extraction};
pub use python::{parse_python_module, ModuleItem, PythonClass, PythonFunction, PythonModule};
pub use xml::{parse_xml_document, XmlElementNode, XmlNode};
