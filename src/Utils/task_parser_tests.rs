#[cfg(test)]
mod tests {
    use crate::Utils::task_parser::{
        load_tasks, load_tasks_from_file, parse_document, parse_key, parse_key_value_pair,
        parse_section, parse_title, parse_value,
    };
    use crate::numerical::analysis::config::{
        AnalysisConfig, CrossingMode, ExtremumMode, IntegrationMethod, IntegrationOutput,
        TrendMode,
    };
    use crate::numerical::analysis::data_source::DataSource;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_key_and_title() {
        let (remaining, key) = parse_key("key_1: value").unwrap();
        assert_eq!(key, "key_1");
        assert_eq!(remaining, ": value");

        let (remaining, title) = parse_title("zeroes\nexpression: x").unwrap();
        assert_eq!(title, "zeroes");
        assert_eq!(remaining, "expression: x");

        let (remaining, title) = parse_title("  taylor  ").unwrap();
        assert_eq!(title, "taylor");
        assert_eq!(remaining, "");

        // a key line is not a title
        assert!(parse_title("expression: x").is_err());
    }

    #[test]
    fn test_parse_value_and_pair() {
        let (remaining, value) = parse_value(" sin(x) * 2 \nnext").unwrap();
        assert_eq!(value, "sin(x) * 2");
        assert_eq!(remaining, "\nnext");

        let (remaining, (key, value)) = parse_key_value_pair("interval : 0, 2*pi\nsamples: 5").unwrap();
        assert_eq!(key, "interval");
        assert_eq!(value, "0, 2*pi");
        assert_eq!(remaining, "samples: 5");

        let (_, (key, value)) = parse_key_value_pair("mode: extrema:min").unwrap();
        assert_eq!(key, "mode");
        assert_eq!(value, "extrema:min");
    }

    #[test]
    fn test_parse_section() {
        let (remaining, (title, pairs)) =
            parse_section("extrema\nexpression: x^2\ninterval: -1, 1\ntaylor\n").unwrap();
        assert_eq!(title, "extrema");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("interval".to_string(), "-1, 1".to_string()));
        assert_eq!(remaining, "taylor\n");
    }

    #[test]
    fn test_parse_document_with_comments() {
        let input = "
            // two tasks
            zeroes
            expression: x^2-4
            # the interval
            interval: 0, 5

            taylor
            expression: exp(x)
        ";
        let document = parse_document(input).unwrap();
        assert_eq!(document.len(), 2);
        assert_eq!(document[0].0, "zeroes");
        assert_eq!(document[0].1.get("interval").unwrap(), "0, 5");
        assert_eq!(document[1].0, "taylor");
        assert_eq!(document[1].1.get("expression").unwrap(), "exp(x)");
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse_document("").is_err());
        assert!(parse_document("zeroes\nexpression x^2").is_err());
        assert!(parse_document("zeroes\nexpression: x\nexpression: y").is_err());
    }

    #[test]
    fn test_load_scan_tasks() {
        let tasks = load_tasks(
            "zeroes\nexpression: x^2-4\ninterval: 0, 5\nsamples: 41\nmode: up\nname: roots\n\
             extrema\nexpression: sin(t)\nvariable: t\ninterval: 0, 2*pi\nmode: Max\neps: 1e-8",
        )
        .unwrap();
        assert_eq!(tasks.len(), 2);
        match &tasks[0].config {
            AnalysisConfig::Zeroes(c) => {
                assert_eq!(c.expression, "x^2-4");
                assert_eq!(c.interval, Some((0.0, 5.0)));
                assert_eq!(c.samples, 41);
                assert_eq!(c.crossing, CrossingMode::Up);
                assert_eq!(c.name.as_deref(), Some("roots"));
            }
            other => panic!("unexpected task {:?}", other),
        }
        match &tasks[1].config {
            AnalysisConfig::Extrema(c) => {
                let (a, b) = c.interval.unwrap();
                assert_eq!(a, 0.0);
                assert_relative_eq!(b, 2.0 * PI);
                assert_eq!(c.extremum, ExtremumMode::Max);
                assert_eq!(c.variable.as_deref(), Some("t"));
                assert_eq!(c.eps, 1e-8);
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_load_integration_tasks() {
        let tasks = load_tasks(
            "integrate\nexpression: x^2\ninterval: 0, 1\nstep: 0.01\nmethod: simpson\noutput: xvals\n\
             integrate2\nexpression: x*y\nxinterval: 0, 1\nyinterval: 0, sqrt(x)\nystep: 1e-3",
        )
        .unwrap();
        match &tasks[0].config {
            AnalysisConfig::Integrate(c) => {
                assert_eq!(c.bounds, Some((0.0, 1.0)));
                assert_eq!(c.step, Some(0.01));
                assert_eq!(c.method, IntegrationMethod::Simpson);
                assert_eq!(c.output, IntegrationOutput::XValues);
            }
            other => panic!("unexpected task {:?}", other),
        }
        match &tasks[1].config {
            AnalysisConfig::Integrate2D(c) => {
                assert_eq!(c.x_variable, "x");
                assert_eq!(
                    c.y_bounds,
                    Some(("0".to_string(), "sqrt(x)".to_string()))
                );
                assert_eq!(c.y_step, Some(1e-3));
                assert_eq!(c.x_step, None);
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_load_trend_task_with_data() {
        let tasks = load_tasks(
            "trend\ndata: 1, 2, nan, 0, -2\nxdata: 0, 0.5, 1, 1.5, 2\nmode: zeroes:down\norder: 3\nrows: 0, 5",
        )
        .unwrap();
        let task = &tasks[0];
        let table = task.data.as_ref().unwrap();
        assert_eq!(table.columns(), 2);
        assert!(!table.cell(2, 0).1);
        match &task.config {
            AnalysisConfig::Trend(c) => {
                assert_eq!(c.column, 0);
                assert_eq!(c.x_column, Some(1));
                assert_eq!(c.mode, TrendMode::Zeroes(CrossingMode::Down));
                assert_eq!(c.order, 3);
                assert_eq!(c.rows, Some((0, 5)));
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_load_taylor_task() {
        let tasks = load_tasks("taylor\nexpression: cos(x)\ncenter: pi/2\norder: 4\nstep: 0.05").unwrap();
        match &tasks[0].config {
            AnalysisConfig::Taylor(c) => {
                assert_relative_eq!(c.center, PI / 2.0);
                assert_eq!(c.order, 4);
                assert_eq!(c.step, 0.05);
            }
            other => panic!("unexpected task {:?}", other),
        }
    }

    #[test]
    fn test_rejected_tasks() {
        assert!(load_tasks("solve\nexpression: x").is_err());
        assert!(load_tasks("zeroes\ninterval: 0, 1").is_err());
        assert!(load_tasks("zeroes\nexpression: x\ncolour: red").is_err());
        assert!(load_tasks("zeroes\nexpression: x\ninterval: 0").is_err());
        assert!(load_tasks("zeroes\nexpression: x\ninterval: 0, y").is_err());
        assert!(load_tasks("zeroes\nexpression: x\nmode: sideways").is_err());
        assert!(load_tasks("trend\ndata: 1, two, 3").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "; demo").unwrap();
        writeln!(file, "extrema").unwrap();
        writeln!(file, "expression: (x-1)^2").unwrap();
        writeln!(file, "interval: -2, 3").unwrap();
        let tasks = load_tasks_from_file(file.path()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].data.is_none());
        assert!(load_tasks_from_file("/nonexistent/tasks.txt").is_err());
    }
}
