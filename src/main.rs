use clap::Parser;
use regenerapp_client::app::budgets::BudgetService;
use regenerapp_client::app::calculator::CalculatorService;
use regenerapp_client::app::dashboard::{summary_lines, DashboardService};
use regenerapp_client::app::export::BudgetExporter;
use regenerapp_client::app::projects::{ProjectQuery, ProjectService};
use regenerapp_client::app::suppliers::CatalogService;
use regenerapp_client::config::cli::{BudgetCommand, CalcCommand, Cli, Command, ExpenseCommand, LineArgs};
use regenerapp_client::config::file::LogFormat;
use regenerapp_client::core::form::{CalculatorKind, Widget};
use regenerapp_client::domain::budget::{
    BudgetFilters, BudgetItemDraft, CopyMultipleRequest, CopyToExpenseRequest, RealExpenseDraft,
};
use regenerapp_client::domain::calculation::{AddToBudgetRequest, CalculationFilters};
use regenerapp_client::domain::catalog::{MaterialFilters, SupplierFilters};
use regenerapp_client::utils::error::ErrorSeverity;
use regenerapp_client::utils::{logger, validation::Validate};
use regenerapp_client::{ApiClient, ClientConfig, Exporter, LocalStorage, Result};
use std::collections::BTreeMap;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (config, format) = match cli.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    match format {
        LogFormat::Json => logger::init_json_logger(),
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
    }
    tracing::debug!(?config, "resolved configuration");

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "configuration validation failed");
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            error = %e,
            category = ?e.category(),
            severity = ?e.severity(),
            "command failed"
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(command: Command, config: &ClientConfig) -> Result<()> {
    let api = ApiClient::new(config)?;

    match command {
        Command::Projects {
            search,
            project_type,
            phase,
        } => {
            let mut service = ProjectService::new(api);
            service.load().await?;
            let query = ProjectQuery {
                search,
                project_type,
                phase,
            };
            for project in service.filter(&query) {
                let marker = if project.selected() { "*" } else { " " };
                println!(
                    "{} #{} {} | {} | {} | {} | {}",
                    marker,
                    project.id.unwrap_or_default(),
                    project.name,
                    project.display_type(),
                    project.display_status(),
                    project.display_phase(),
                    project.formatted_budget()
                );
            }
        }
        Command::Select { id } => {
            let project = ProjectService::new(api).select(id).await?;
            println!("✅ Proyecto seleccionado: {}", project.name);
        }
        Command::Selected => match ProjectService::new(api).fetch_selected().await? {
            Some(project) => println!(
                "#{} {} ({})",
                project.id.unwrap_or_default(),
                project.name,
                project.date_range()
            ),
            None => println!("No hay proyecto seleccionado"),
        },
        Command::AdvancePhase { id } => {
            let project = ProjectService::new(api).advance_phase(id).await?;
            println!("✅ {} ahora en fase {}", project.name, project.display_phase());
        }
        Command::Dashboard { project } => {
            let dashboard = DashboardService::new(api).load(project).await?;
            for line in summary_lines(&dashboard) {
                println!("{}", line);
            }
        }
        Command::Materials {
            search,
            category,
            category_type,
            limit,
        } => {
            let catalog = CatalogService::new(api);
            let materials = match (search, limit) {
                (Some(text), Some(limit)) => catalog.search_materials(&text, Some(limit)).await?,
                (search, _) => {
                    catalog
                        .materials(&MaterialFilters {
                            search,
                            category,
                            category_type,
                            ..Default::default()
                        })
                        .await?
                }
            };
            for material in materials {
                println!("#{} {} | {}", material.id, material.display_name(), material.formatted_price());
            }
        }
        Command::Suppliers {
            search,
            supplier_type,
            city,
            preferred,
            category_type,
        } => {
            let catalog = CatalogService::new(api);
            let suppliers = match category_type {
                Some(category_type) => catalog.suppliers_by_category(Some(&category_type)).await?,
                None => {
                    catalog
                        .suppliers_sorted(&SupplierFilters {
                            search,
                            supplier_type,
                            city,
                            is_preferred: preferred.then_some(true),
                            is_active: None,
                        })
                        .await?
                }
            };
            for supplier in suppliers {
                println!(
                    "#{} {}{} | {} | {}",
                    supplier.id,
                    supplier.display_name(),
                    if supplier.preferred() { " ★" } else { "" },
                    supplier.full_address(),
                    supplier.whatsapp_url().unwrap_or_default()
                );
            }
        }
        Command::Prices { material } => {
            let offers = CalculatorService::new(api).providers_for_material(material).await?;
            if offers.is_empty() {
                println!("Sin proveedores para este material");
            }
            for offer in offers {
                println!("{} {} {}", offer, offer.discount_text(), offer.rating_stars());
            }
        }
        Command::Budget(command) => run_budget(command, BudgetService::new(api)).await?,
        Command::Expense(command) => run_expense(command, BudgetService::new(api)).await?,
        Command::Summary { project, refresh } => {
            let budgets = BudgetService::new(api.clone());
            if refresh && budgets.refresh_summary().await.is_none() {
                println!("⚠️ No se pudo actualizar el resumen financiero");
            }
            let records = match project {
                Some(project) => api.financial_summaries(Some(project)).await?.into_results(),
                None => vec![api.financial_summary_for_selected_project().await?],
            };
            for record in records {
                println!(
                    "{} | Presupuesto ${:.2} | Gastos ${:.2} | Balance ${:.2}{}",
                    record.project_name.as_deref().unwrap_or("-"),
                    record.total_budget,
                    record.total_expenses,
                    record.balance,
                    if record.is_over_budget { " | EXCEDIDO" } else { "" }
                );
            }
        }
        Command::Calc(command) => run_calc(command, CalculatorService::new(api)).await?,
        Command::Export { project } => {
            let storage = LocalStorage::new(config.output_path.clone());
            let exporter = BudgetExporter::new(api, storage, config.output_path.clone());
            let path = exporter.export_project(project).await?;
            println!("✅ Exportado: {}", path);
        }
        Command::Health => {
            let health = api.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        Command::ServerConfig => {
            let settings = api.app_config().await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}

fn budget_draft(line: LineArgs, discount: Option<f64>) -> BudgetItemDraft {
    BudgetItemDraft {
        id: line.id,
        project: line.project,
        description: line.description,
        category: line.category,
        spaces: line.spaces,
        quantity: Some(line.quantity),
        unit: line.unit,
        unit_price: Some(line.unit_price),
        material: line.material,
        supplier: line.supplier,
        notes: line.notes,
        discount,
    }
}

async fn run_budget(command: BudgetCommand, budgets: BudgetService) -> Result<()> {
    match command {
        BudgetCommand::List { project, category } => {
            let filters = BudgetFilters {
                category,
                ..BudgetFilters::for_project(project)
            };
            for item in budgets.items(&filters).await? {
                println!(
                    "#{} {} | {} | {:.2} {} x ${:.2} = {}",
                    item.id,
                    item.description,
                    item.category_label(),
                    item.quantity,
                    item.unit,
                    item.unit_price,
                    item.formatted_total()
                );
            }
        }
        BudgetCommand::Save { line, discount } => {
            let draft = budget_draft(line, discount);
            println!("Total estimado: ${:.2}", draft.total_price());
            let item = budgets.save_item(&draft).await?;
            println!("✅ Ítem guardado (#{})", item.id);
        }
        BudgetCommand::Delete { id } => {
            budgets.delete_item(id).await?;
            println!("✅ Ítem eliminado");
        }
        BudgetCommand::Copy {
            id,
            date,
            supplier,
            notes,
        } => {
            let request = CopyToExpenseRequest {
                purchase_date: date,
                supplier,
                notes,
                ..Default::default()
            };
            let expense = budgets.copy_to_expense(id, &request).await?;
            println!("✅ Gasto creado (#{}) {}", expense.id, expense.formatted_total());
        }
        BudgetCommand::CopyMany { ids, date, supplier } => {
            let request = CopyMultipleRequest {
                budget_item_ids: ids,
                purchase_date: date,
                default_supplier: supplier,
            };
            let response = budgets.copy_many_to_expenses(&request).await?;
            println!(
                "✅ {} gastos creados, {} errores",
                response.created_expenses_count, response.errors_count
            );
        }
        BudgetCommand::Rollup { project } => {
            let summary = budgets.budget_rollup(project).await?;
            for row in summary.by_category {
                println!(
                    "{} | {} ítems | ${:.2}",
                    row.category_display, row.items_count, row.total_amount
                );
            }
            println!("Total: ${:.2}", summary.total_budget);
        }
    }
    Ok(())
}

async fn run_expense(command: ExpenseCommand, budgets: BudgetService) -> Result<()> {
    match command {
        ExpenseCommand::List {
            project,
            category,
            from,
            to,
        } => {
            let filters = BudgetFilters {
                category,
                date_from: from,
                date_to: to,
                ..BudgetFilters::for_project(project)
            };
            for expense in budgets.expenses(&filters).await? {
                println!(
                    "#{} {} | {} | {} | {}",
                    expense.id,
                    expense.purchase_date.as_deref().unwrap_or("-"),
                    expense.description,
                    expense.category_label(),
                    expense.formatted_total()
                );
            }
        }
        ExpenseCommand::Save {
            line,
            discount_percentage,
            discount_amount,
            date,
            invoice,
            payment_method,
            budget_item,
        } => {
            let draft = RealExpenseDraft {
                id: line.id,
                project: line.project,
                budget_item,
                description: line.description,
                category: line.category,
                spaces: line.spaces,
                quantity: Some(line.quantity),
                unit: line.unit,
                unit_price: Some(line.unit_price),
                discount_percentage,
                discount_amount,
                purchase_date: date,
                invoice_number: invoice,
                payment_method,
                material: line.material,
                supplier: line.supplier,
                notes: line.notes,
            };
            println!("Total estimado: ${:.2}", draft.total_price());
            let expense = budgets.save_expense(&draft).await?;
            println!("✅ Gasto guardado (#{})", expense.id);
        }
        ExpenseCommand::Delete { id } => {
            budgets.delete_expense(id).await?;
            println!("✅ Gasto eliminado");
        }
        ExpenseCommand::Rollup { project } => {
            let summary = budgets.expense_rollup(project).await?;
            for row in summary.by_category {
                println!(
                    "{} | {} gastos | ${:.2}",
                    row.category_display, row.expenses_count, row.total_spent
                );
            }
            println!("Total: ${:.2}", summary.total_expenses);
        }
    }
    Ok(())
}

async fn run_calc(command: CalcCommand, calculator: CalculatorService) -> Result<()> {
    match command {
        CalcCommand::Types => {
            for kind in CalculatorKind::ALL {
                println!("{:<10} {} ({})", kind.code(), kind.display_name(), kind.category());
            }
        }
        CalcCommand::Form { kind } => {
            let kind: CalculatorKind = kind.parse()?;
            for field in calculator.form(kind).await? {
                let widget = match field.widget() {
                    Widget::DecimalInput => "decimal",
                    Widget::IntegerInput => "entero",
                    Widget::Dropdown => "opciones",
                    Widget::TextInput => "texto",
                };
                println!(
                    "{}{} [{}] {} {}",
                    field.key,
                    if field.required { "*" } else { "" },
                    widget,
                    field.label,
                    field.help_text()
                );
            }
        }
        CalcCommand::Run {
            kind,
            project,
            material,
            inputs,
        } => {
            let kind: CalculatorKind = kind.parse()?;
            let fields = calculator.form(kind).await?;
            let input: BTreeMap<String, String> = inputs.into_iter().collect();
            let outcome = calculator.run(kind, &fields, &input, project, material).await?;
            print!("{}", outcome.view);
            println!("Cálculo #{}", outcome.response.calculation_id);
        }
        CalcCommand::Materials { kind } => {
            let kind: CalculatorKind = kind.parse()?;
            for material in calculator.suggested_materials(kind).await? {
                println!("#{} {} | {}", material.id, material.name, material.formatted_price());
            }
        }
        CalcCommand::AddToBudget {
            calculation,
            supplier,
            unit_price,
            spaces,
            notes,
        } => {
            let request = AddToBudgetRequest {
                supplier_id: supplier,
                unit_price_override: unit_price,
                spaces,
                notes,
            };
            let response = calculator.add_to_budget(calculation, &request).await?;
            println!(
                "✅ {} (ítem #{})",
                response.message.as_deref().unwrap_or("Agregado al presupuesto"),
                response.budget_item_id.unwrap_or_default()
            );
        }
        CalcCommand::History { project } => {
            let filters = CalculationFilters {
                project,
                ..Default::default()
            };
            for record in calculator.history(&filters).await? {
                println!(
                    "#{} {} | {:.2} {} | {}",
                    record.id,
                    record.calculation_type_name.as_deref().unwrap_or("-"),
                    record.calculated_quantity,
                    record.unit,
                    if record.added_to_budget { "en presupuesto" } else { "" }
                );
            }
        }
    }
    Ok(())
}
