use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::chart::{ChartData, ChartShape};
use crate::error::Result;
use crate::model::{AGE_HEADER, AggregatedSeries};

/// Sheet holding the chart series in the shape the chart was built with.
pub const CHART_SHEET: &str = "Chart";
/// Sheet holding the plain age × region counts.
pub const AGGREGATED_SHEET: &str = "Aggregated";

/// Writes the chart data and the aggregated counts to an xlsx workbook.
pub fn write_chart_workbook(
    path: &Path,
    chart: &ChartData,
    series: &AggregatedSeries,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(CHART_SHEET)?;
    write_chart_sheet(worksheet, chart, &header)?;

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(AGGREGATED_SHEET)?;
    let columns: Vec<String> = series
        .regions
        .iter()
        .map(|region| region.region.clone())
        .collect();
    let rows: Vec<(u32, Vec<f64>)> = series
        .ages
        .iter()
        .enumerate()
        .map(|(position, age)| {
            let values = series
                .regions
                .iter()
                .map(|region| {
                    region.counts.get(position).copied().unwrap_or_default() as f64
                })
                .collect();
            (*age, values)
        })
        .collect();
    write_age_table(worksheet, 0, &columns, &rows, &header)?;

    workbook.save(path)?;
    Ok(())
}

fn write_chart_sheet(worksheet: &mut Worksheet, chart: &ChartData, header: &Format) -> Result<()> {
    let (columns, rows): (Vec<String>, Vec<(u32, Vec<f64>)>) = match &chart.shape {
        ChartShape::Lines { series } => {
            let columns: Vec<String> = series.iter().map(|line| line.region.clone()).collect();
            let ages: Vec<u32> = series
                .first()
                .map(|line| line.points.iter().map(|(age, _)| *age).collect())
                .unwrap_or_default();
            let rows: Vec<(u32, Vec<f64>)> = ages
                .iter()
                .enumerate()
                .map(|(position, age)| {
                    let values = series
                        .iter()
                        .map(|line| {
                            line.points
                                .get(position)
                                .map_or(0.0, |(_, count)| *count as f64)
                        })
                        .collect();
                    (*age, values)
                })
                .collect();
            (columns, rows)
        }
        ChartShape::Pyramid { region, bars } => {
            let columns = vec![format!("{region} (left)"), format!("{region} (right)")];
            let rows: Vec<(u32, Vec<f64>)> = bars
                .iter()
                .map(|bar| (bar.age, vec![bar.left as f64, bar.right as f64]))
                .collect();
            (columns, rows)
        }
        ChartShape::GroupedBars { regions, groups } => {
            let rows: Vec<(u32, Vec<f64>)> = groups
                .iter()
                .map(|group| {
                    let values = group.values.iter().map(|value| *value as f64).collect();
                    (group.age, values)
                })
                .collect();
            (regions.clone(), rows)
        }
    };

    worksheet.write_string_with_format(0, 0, &chart.title, header)?;
    write_age_table(worksheet, 2, &columns, &rows, header)
}

fn write_age_table(
    worksheet: &mut Worksheet,
    first_row: u32,
    columns: &[String],
    rows: &[(u32, Vec<f64>)],
    header: &Format,
) -> Result<()> {
    worksheet.write_string_with_format(first_row, 0, AGE_HEADER, header)?;
    for (col_idx, column) in columns.iter().enumerate() {
        worksheet.write_string_with_format(first_row, (col_idx + 1) as u16, column, header)?;
    }

    for (row_idx, (age, values)) in rows.iter().enumerate() {
        let row = first_row + 1 + row_idx as u32;
        worksheet.write_number(row, 0, *age as f64)?;
        for (col_idx, value) in values.iter().enumerate() {
            worksheet.write_number(row, (col_idx + 1) as u16, *value)?;
        }
    }
    Ok(())
}
