//! tree-sitter-typescript node kind constants.
//!
//! No magic strings scattered through the extractors, one source of truth
//! for the grammar's node type names.

pub const PROGRAM: &str = "program";

pub const CLASS_DECLARATION: &str = "class_declaration";
pub const CLASS_BODY: &str = "class_body";
pub const CLASS_HERITAGE: &str = "class_heritage";
pub const EXTENDS_CLAUSE: &str = "extends_clause";

pub const INTERFACE_DECLARATION: &str = "interface_declaration";
pub const TYPE_ALIAS_DECLARATION: &str = "type_alias_declaration";

pub const METHOD_DEFINITION: &str = "method_definition";
pub const METHOD_SIGNATURE: &str = "method_signature";
pub const ABSTRACT_METHOD_SIGNATURE: &str = "abstract_method_signature";
pub const PUBLIC_FIELD_DEFINITION: &str = "public_field_definition";
pub const PROPERTY_SIGNATURE: &str = "property_signature";

pub const FORMAL_PARAMETERS: &str = "formal_parameters";
pub const REQUIRED_PARAMETER: &str = "required_parameter";
pub const OPTIONAL_PARAMETER: &str = "optional_parameter";
pub const OBJECT_PATTERN: &str = "object_pattern";
pub const PAIR_PATTERN: &str = "pair_pattern";
pub const SHORTHAND_PROPERTY_IDENTIFIER_PATTERN: &str = "shorthand_property_identifier_pattern";
pub const ASSIGNMENT_PATTERN: &str = "assignment_pattern";
pub const REST_PATTERN: &str = "rest_pattern";

pub const IMPORT_STATEMENT: &str = "import_statement";
pub const IMPORT_CLAUSE: &str = "import_clause";
pub const NAMED_IMPORTS: &str = "named_imports";
pub const IMPORT_SPECIFIER: &str = "import_specifier";
pub const NAMESPACE_IMPORT: &str = "namespace_import";
pub const EXPORT_STATEMENT: &str = "export_statement";
pub const CALL_EXPRESSION: &str = "call_expression";

pub const TYPE_ANNOTATION: &str = "type_annotation";
pub const TYPE_IDENTIFIER: &str = "type_identifier";
pub const GENERIC_TYPE: &str = "generic_type";
pub const UNION_TYPE: &str = "union_type";
pub const INTERSECTION_TYPE: &str = "intersection_type";
pub const PARENTHESIZED_TYPE: &str = "parenthesized_type";
pub const OBJECT_TYPE: &str = "object_type";
pub const NESTED_IDENTIFIER: &str = "nested_type_identifier";

pub const ACCESSIBILITY_MODIFIER: &str = "accessibility_modifier";
pub const STATIC: &str = "static";
pub const ASYNC: &str = "async";
pub const ABSTRACT: &str = "abstract";
pub const READONLY: &str = "readonly";
pub const GET: &str = "get";
pub const SET: &str = "set";

pub const IDENTIFIER: &str = "identifier";
pub const PROPERTY_IDENTIFIER: &str = "property_identifier";
pub const PRIVATE_PROPERTY_IDENTIFIER: &str = "private_property_identifier";
pub const THIS: &str = "this";
pub const SUPER: &str = "super";
pub const MEMBER_EXPRESSION: &str = "member_expression";
pub const SUBSCRIPT_EXPRESSION: &str = "subscript_expression";
pub const STRING: &str = "string";
pub const STRING_FRAGMENT: &str = "string_fragment";
pub const NEW_EXPRESSION: &str = "new_expression";
pub const STATEMENT_BLOCK: &str = "statement_block";
pub const LEXICAL_DECLARATION: &str = "lexical_declaration";
pub const VARIABLE_DECLARATOR: &str = "variable_declarator";
pub const ARROW_FUNCTION: &str = "arrow_function";
pub const FUNCTION_EXPRESSION: &str = "function_expression";
pub const FUNCTION_DECLARATION: &str = "function_declaration";
pub const COMMENT: &str = "comment";
