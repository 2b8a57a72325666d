use crate::config::RuleConfig;
use crate::editor::TypeScriptEditor;
use crate::operations::{Finding, FindingReport, FixUnavailable};
use crate::parser::parse;
use crate::syntax::Dialect;
use crate::visitor::collect_findings;

fn findings_in(source: &str) -> Vec<Finding> {
    let tree = parse(source, Dialect::TypeScript).unwrap();
    collect_findings(&tree, &RuleConfig::default())
}

fn aliases(source: &str) -> Vec<String> {
    findings_in(source).into_iter().map(|f| f.alias_name).collect()
}

fn fixed(source: &str) -> String {
    let mut editor = TypeScriptEditor::new(source, Dialect::TypeScript).unwrap();
    editor.fix_all(&RuleConfig::default(), 10).unwrap();
    editor.content().to_string()
}

mod detection_tests {
    use super::*;

    #[test]
    fn test_single_line_variable_is_ignored() {
        assert!(findings_in("let cfg: { host: string; port: number };\n").is_empty());
    }

    #[test]
    fn test_single_line_return_type_is_ignored() {
        let source = "function getCfg(): { host: string; port: number } { return { host: '', port: 0 }; }\n";
        assert!(findings_in(source).is_empty());
    }

    #[test]
    fn test_multiline_variable_is_reported_once() {
        let source = "let myConfig: {\n  host: string;\n  port: number;\n};\n";
        let findings = findings_in(source);
        assert_eq!(findings.len(), 1);

        let location = findings[0].location();
        assert_eq!((location.line, location.column), (1, 15));
        assert_eq!((location.end_line, location.end_column), (4, 2));
        assert_eq!(findings[0].alias_name, "MyConfigType");
        assert!(findings[0].is_fixable());
    }

    #[test]
    fn test_definitions_are_never_reported() {
        let source = "\
type Wrapper = {
  kind: 'wrapper';
  content: {
    text: string;
  };
};

interface Shape {
  inner: {
    x: number;
  };
}
";
        assert!(findings_in(source).is_empty());
    }

    #[test]
    fn test_nested_literal_is_not_reported_separately() {
        let source = "let state: {\n  user: {\n    name: string;\n  };\n};\n";
        let findings = findings_in(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location().line, 1);
    }

    #[test]
    fn test_literal_inside_generic_is_not_reported() {
        let source = "let list: Array<{\n  id: string;\n}>;\n";
        assert!(findings_in(source).is_empty());
    }

    #[test]
    fn test_callback_parameter_has_no_fix() {
        let source = "items.forEach((item: {\n  id: string;\n}) => console.log(item.id));\n";
        let findings = findings_in(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].alias_name, "ItemType");
        assert_eq!(findings[0].fix, Err(FixUnavailable::NoInsertionPoint));
    }

    #[test]
    fn test_withheld_fix_is_logged_at_debug() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::fmt::MakeWriter;

        #[derive(Clone, Default)]
        struct Logs(Arc<Mutex<Vec<u8>>>);

        impl Write for Logs {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        impl<'a> MakeWriter<'a> for Logs {
            type Writer = Logs;

            fn make_writer(&'a self) -> Self::Writer {
                self.clone()
            }
        }

        let logs = Logs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();

        let source = "items.forEach((item: {\n  id: string;\n}) => console.log(item.id));\n";
        let findings = tracing::subscriber::with_default(subscriber, || findings_in(source));
        assert_eq!(findings.len(), 1);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("DEBUG"));
        assert!(output.contains("no enclosing statement for inline type literal"));
        assert!(output.contains("alias=ItemType"));
    }

    #[test]
    fn test_type_parameter_use_withholds_fix() {
        let source = "function wrap<T>(input: {\n  value: T;\n}) {\n  return input.value;\n}\n";
        let findings = findings_in(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].alias_name, "InputType");
        assert_eq!(findings[0].fix, Err(FixUnavailable::CapturesTypeParameter));
    }

    #[test]
    fn test_tsx_component_props() {
        let source = "function Card(props: {\n  title: string;\n}) {\n  return <h1>{props.title}</h1>;\n}\n";
        let tree = parse(source, Dialect::Tsx).unwrap();
        assert!(!tree.has_errors());
        let findings = collect_findings(&tree, &RuleConfig::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].alias_name, "PropsType");
    }

    #[test]
    fn test_finding_report_json() {
        let source = "let myConfig: {\n  host: string;\n};\n";
        let finding = &findings_in(source)[0];
        let report = FindingReport::new("src/a.ts".into(), "no-multiline-inline-type", finding);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["message_id"], "inlineTypeLiteral");
        assert_eq!(json["alias_name"], "MyConfigType");
        assert_eq!(json["fixable"], true);
        assert_eq!(json["location"]["line"], 1);
        assert!(json.get("fix_unavailable").is_none());
    }
}

mod naming_tests {
    use super::*;

    #[test]
    fn test_return_type_of_named_function() {
        let source = "\
function fetchData(): {
  items: string[];
  total: number;
} {
  return { items: [], total: 0 };
}
";
        assert_eq!(aliases(source), vec!["FetchDataReturnType"]);
    }

    #[test]
    fn test_destructured_props_of_named_function() {
        let source = "\
function PureSendButton({
  submitForm,
  input,
}: {
  submitForm: () => void;
  input: string;
}) {
  return input;
}
";
        assert_eq!(aliases(source), vec!["PureSendButtonProps"]);
    }

    #[test]
    fn test_parameter_property() {
        let source = "\
class Service {
  constructor(private readonly options: {
    retries: number;
  }) {}
}
";
        assert_eq!(aliases(source), vec!["OptionsType"]);
    }

    #[test]
    fn test_destructured_array_parameter() {
        let source = "function pair([a, b]: {\n  0: string;\n  1: number;\n}) {}\n";
        assert_eq!(aliases(source), vec!["ParamsType"]);
    }

    #[test]
    fn test_class_property() {
        let source = "class Store {\n  state: {\n    count: number;\n  } = { count: 0 };\n}\n";
        assert_eq!(aliases(source), vec!["StateType"]);
    }

    #[test]
    fn test_method_return_type() {
        let source = "\
class Api {
  fetch(): {
    ok: boolean;
  } {
    return { ok: true };
  }
}
";
        assert_eq!(aliases(source), vec!["FetchReturnType"]);
    }

    #[test]
    fn test_arrow_return_takes_variable_name() {
        let source = "const load_user = (): {\n  id: string;\n} => ({ id: '' });\n";
        assert_eq!(aliases(source), vec!["LoadUserReturnType"]);
    }

    #[test]
    fn test_snake_case_binding() {
        let source = "let http_options: {\n  timeout: number;\n};\n";
        assert_eq!(aliases(source), vec!["HttpOptionsType"]);
    }

    #[test]
    fn test_destructured_binding_falls_back() {
        let source = "const { a }: {\n  a: string;\n} = v;\n";
        assert_eq!(aliases(source), vec!["ExtractedType"]);
    }

    #[test]
    fn test_private_class_property() {
        let source = "class Store {\n  #state: {\n    count: number;\n  } = { count: 0 };\n}\n";
        assert_eq!(aliases(source), vec!["StateType"]);
    }

    #[test]
    fn test_colliding_names_are_disambiguated() {
        let source = "\
type ConfigType = string;

function first(config: {
  a: string;
}) {}

function second(config: {
  b: string;
}) {}
";
        assert_eq!(aliases(source), vec!["ConfigType2", "ConfigType3"]);

        let tree = parse(source, Dialect::TypeScript).unwrap();
        let plain = RuleConfig {
            disambiguate_names: false,
        };
        let names: Vec<_> = collect_findings(&tree, &plain)
            .into_iter()
            .map(|f| f.alias_name)
            .collect();
        assert_eq!(names, vec!["ConfigType", "ConfigType"]);
    }
}

mod fix_tests {
    use super::*;

    #[test]
    fn test_fix_variable() {
        let source = "let myConfig: {\n  host: string;\n  port: number;\n};\n";
        assert_eq!(
            fixed(source),
            "type MyConfigType = {\n  host: string;\n  port: number;\n};\n\nlet myConfig: MyConfigType;\n"
        );
    }

    #[test]
    fn test_fix_destructured_props() {
        let source = "\
function PureSendButton({
  submitForm,
  input,
}: {
  submitForm: () => void;
  input: string;
}) {
  return input;
}
";
        let expected = "\
type PureSendButtonProps = {
  submitForm: () => void;
  input: string;
};

function PureSendButton({
  submitForm,
  input,
}: PureSendButtonProps) {
  return input;
}
";
        assert_eq!(fixed(source), expected);
    }

    #[test]
    fn test_fix_inserts_before_export() {
        let source = "export class Store {\n  state: {\n    count: number;\n  } = { count: 0 };\n}\n";
        let output = fixed(source);
        assert!(output.starts_with("type StateType = {\n    count: number;\n  };\n\nexport class Store {"));
        assert!(output.contains("  state: StateType = { count: 0 };"));
    }

    #[test]
    fn test_fix_inserts_before_declare() {
        let source = "declare const settings: {\n  debug: boolean;\n};\n";
        assert_eq!(
            fixed(source),
            "type SettingsType = {\n  debug: boolean;\n};\n\ndeclare const settings: SettingsType;\n"
        );
    }

    #[test]
    fn test_fix_keeps_block_indentation() {
        let source = "\
function outer() {
  if (ready) {
    const local: {
      flag: boolean;
    } = { flag: true };
  }
}
";
        let expected = "\
function outer() {
  if (ready) {
    type LocalType = {
      flag: boolean;
    };

    const local: LocalType = { flag: true };
  }
}
";
        assert_eq!(fixed(source), expected);
    }

    #[test]
    fn test_fix_parameter_property_before_class() {
        let source = "\
class Service {
  constructor(private readonly options: {
    retries: number;
  }) {}
}
";
        let expected = "\
type OptionsType = {
    retries: number;
  };

class Service {
  constructor(private readonly options: OptionsType) {}
}
";
        assert_eq!(fixed(source), expected);
    }

    #[test]
    fn test_fixes_sharing_an_anchor_keep_report_order() {
        let source = "\
export const handler = (req: {
  body: string;
}): {
  status: number;
} => ({ status: 200 });
";
        let expected = "\
type ReqType = {
  body: string;
};

type HandlerReturnType = {
  status: number;
};

export const handler = (req: ReqType): HandlerReturnType => ({ status: 200 });
";
        let mut editor = TypeScriptEditor::new(source, Dialect::TypeScript).unwrap();
        let outcome = editor.fix_all(&RuleConfig::default(), 10).unwrap();
        assert_eq!(outcome.applied, 2);
        assert_eq!(outcome.aliases, vec!["ReqType", "HandlerReturnType"]);
        assert_eq!(editor.content(), expected);
    }

    #[test]
    fn test_fixed_output_is_clean() {
        let source = "\
type ConfigType = string;

interface Existing {
  nested: {
    a: string;
  };
}

function first(config: {
  a: string;
}) {}

export function second(config: {
  b: string;
}): {
  ok: boolean;
} {
  return { ok: true };
}
";
        let output = fixed(source);
        let tree = parse(&output, Dialect::TypeScript).unwrap();
        assert!(!tree.has_errors());
        assert!(collect_findings(&tree, &RuleConfig::default()).is_empty());

        assert!(output.contains("interface Existing {\n  nested: {\n    a: string;\n  };\n}"));
        assert!(output.contains("function first(config: ConfigType2) {}"));
        assert!(output.contains("export function second(config: ConfigType3): SecondReturnType {"));
        assert!(output.contains("type ConfigType = string;"));
    }

    #[test]
    fn test_comment_before_literal_is_kept() {
        let source = "let a: /* shape */ {\n  x: number;\n};\n";
        assert_eq!(
            fixed(source),
            "type AType = {\n  x: number;\n};\n\nlet a: /* shape */ AType;\n"
        );
    }

    #[test]
    fn test_fix_destructured_binding_uses_fallback_name() {
        let source = "const { a }: {\n  a: string;\n} = v;\n";
        assert_eq!(
            fixed(source),
            "type ExtractedType = {\n  a: string;\n};\n\nconst { a }: ExtractedType = v;\n"
        );
    }

    #[test]
    fn test_type_parameter_literals_are_left_in_place() {
        let function = "function wrap<T>(input: {\n  value: T;\n}) {\n  return input.value;\n}\n";
        assert_eq!(fixed(function), function);

        let class = "class Box<T> {\n  slot: {\n    item: T;\n  };\n}\n";
        assert_eq!(fixed(class), class);

        let this_type = "class Node {\n  link: {\n    next: this;\n  };\n}\n";
        assert_eq!(fixed(this_type), this_type);
    }

    #[test]
    fn test_local_literal_in_generic_function_is_fixed() {
        let source = "\
function wrap<T>(x: T) {
  const boxed: {
    value: T;
  } = { value: x };
  return boxed;
}
";
        let expected = "\
function wrap<T>(x: T) {
  type BoxedType = {
    value: T;
  };

  const boxed: BoxedType = { value: x };
  return boxed;
}
";
        assert_eq!(fixed(source), expected);
    }

    #[test]
    fn test_unresolved_finding_leaves_source_untouched() {
        let source = "items.forEach((item: {\n  id: string;\n}) => console.log(item.id));\n";
        assert_eq!(fixed(source), source);
    }
}
