mod cycle_rules;
