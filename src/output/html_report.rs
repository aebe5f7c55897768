//! The static timetable page

use std::{fmt::Write as _, fs, io, path::Path};

use crate::{
    model::{RouteResult, RunSnapshot},
    utils::escape_html,
};

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Rail Timetables</title>
    <style>
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f5f5f5;
        }
        .header {
            text-align: center;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 30px;
            border-radius: 10px;
            margin-bottom: 30px;
        }
        .route {
            background: white;
            margin: 20px 0;
            padding: 20px;
            border-radius: 10px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        .route h2 {
            color: #333;
            border-bottom: 3px solid #667eea;
            padding-bottom: 10px;
        }
        .route-info {
            background: #f8f9fa;
            padding: 15px;
            border-radius: 5px;
            margin: 15px 0;
        }
        table {
            width: 100%;
            border-collapse: collapse;
            margin-top: 15px;
        }
        th, td {
            padding: 12px;
            text-align: left;
            border-bottom: 1px solid #ddd;
        }
        th {
            background-color: #667eea;
            color: white;
        }
        tr:nth-child(even) {
            background-color: #f2f2f2;
        }
        .last-updated {
            text-align: center;
            color: #666;
            font-style: italic;
            margin-top: 30px;
        }
        .no-data {
            text-align: center;
            color: #999;
            padding: 20px;
            font-style: italic;
        }
    </style>
</head>
<body>
    <div class="header">
        <h1>Rail Timetables</h1>
        <p>Current train schedules for your daily commute</p>
    </div>
"#;

pub fn render_html(snapshot: &RunSnapshot) -> String {
    let mut html = String::from(HEAD);

    for route in &snapshot.routes {
        render_route(&mut html, route);
    }

    // Writing to a String can't fail
    _ = write!(
        html,
        r#"    <div class="last-updated">
        Last updated: {}
    </div>
</body>
</html>
"#,
        escape_html(&snapshot.last_updated)
    );

    html
}

fn render_route(html: &mut String, route: &RouteResult) {
    _ = write!(
        html,
        r#"    <div class="route">
        <h2>{}</h2>
        <div class="route-info">
            <strong>From:</strong> {}
            <strong>To:</strong> {}
        </div>
"#,
        escape_html(&route.name),
        escape_html(&route.departure_station),
        escape_html(&route.arrival_station)
    );

    if route.timetable.is_empty() {
        html.push_str("        <div class=\"no-data\">No timetable data available</div>\n");
    } else {
        html.push_str(
            r#"        <table>
            <thead>
                <tr>
                    <th>Departure Time</th>
                    <th>Arrival Time</th>
                </tr>
            </thead>
            <tbody>
"#,
        );
        for trip in &route.timetable {
            _ = write!(
                html,
                "                <tr>\n                    <td>{}</td>\n                    <td>{}</td>\n                </tr>\n",
                escape_html(&trip.departure),
                escape_html(&trip.arrival)
            );
        }
        html.push_str("            </tbody>\n        </table>\n");
    }

    html.push_str("    </div>\n");
}

pub fn save_html(path: &Path, html: &str) -> io::Result<()> {
    fs::write(path, html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimePair;

    fn snapshot() -> RunSnapshot {
        RunSnapshot {
            last_updated: "2024-05-01 06:00:00".to_string(),
            routes: vec![
                RouteResult {
                    name: "Laagri to Tallinn".to_string(),
                    departure_station: "Laagri".to_string(),
                    arrival_station: "Tallinn".to_string(),
                    timetable: vec![TimePair::new("07:05", "07:21"), TimePair::new("08:10", "08:26")],
                },
                RouteResult {
                    name: "Tallinn to <Laagri>".to_string(),
                    departure_station: "Tallinn".to_string(),
                    arrival_station: "Laagri".to_string(),
                    timetable: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_render_html() {
        let html = render_html(&snapshot());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h2>Laagri to Tallinn</h2>"));
        assert!(html.contains("<td>07:05</td>"));
        assert!(html.contains("<td>08:26</td>"));
        assert_eq!(html.matches("<table>").count(), 1);
        assert!(html.contains("<h2>Tallinn to &lt;Laagri&gt;</h2>"));
        assert!(html.contains("No timetable data available"));
        assert!(html.contains("Last updated: 2024-05-01 06:00:00"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
